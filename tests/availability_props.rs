mod common;

use proptest::prelude::*;

use cinema_api::services::sessions::SessionFilter;
use common::TestApp;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn available_is_capacity_minus_sold(sold in 0i32..60) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let available = rt.block_on(async {
            let app = TestApp::new();
            let (user, _) = app.create_user(false).await;
            let movie = app.sample_movie("Sample movie").await;
            let session = app.sample_movie_session("2022-06-02T14:00:00Z", &movie).await;
            // 20 мест в ряду: раскладываем билеты по рядам
            for n in 0..sold {
                app.sample_ticket(&user, &session, n / 20 + 1, n % 20 + 1).await;
            }
            let sessions = app
                .state
                .store
                .list_movie_sessions(&SessionFilter::new(app.state.config.app.time_zone))
                .await
                .unwrap();
            sessions[0].tickets_available()
        });

        prop_assert_eq!(available, 400 - i64::from(sold));
    }
}
