use super::types::{SortDirection, SortField};

pub struct FilterOrder;

impl FilterOrder {
    /// `id` is appended as a tiebreaker so pages never overlap
    pub fn generate(field: SortField, direction: SortDirection) -> String {
        format!(
            "ORDER BY \"{}\" {}, \"id\" {}",
            field.column(),
            direction.to_sql(),
            direction.to_sql()
        )
    }
}
