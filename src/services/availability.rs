//! Остаток мест на сеанс.
//!
//! Считается при каждом чтении и никогда не кешируется: число билетов
//! меняется между запросами.

/// `capacity - sold`. Не обрезается снизу: за границы зала не даёт выйти
/// проверка билетов при создании заказа.
pub fn tickets_available(capacity: i64, sold: i64) -> i64 {
    capacity - sold
}
