use crate::models::TourRecord;

/// Choose the tour for the hero banner.
///
/// The pointer wins when it names a listed tour, then the first listed tour,
/// then the built-in default. A stale pointer is never an error.
pub fn select_featured(tours: &[TourRecord], featured_id: &str) -> TourRecord {
    let pointed = (!featured_id.is_empty())
        .then(|| tours.iter().find(|t| t.id == featured_id))
        .flatten();

    pointed
        .or_else(|| tours.first())
        .cloned()
        .unwrap_or_else(super::default_tour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_tour, seed_tours};

    #[test]
    fn test_pointer_to_listed_tour() {
        let tours = seed_tours();
        assert_eq!(select_featured(&tours, "jeju-402").id, "jeju-402");
    }

    #[test]
    fn test_empty_pointer_takes_first() {
        let tours = seed_tours();
        assert_eq!(select_featured(&tours, ""), tours[0]);
    }

    #[test]
    fn test_stale_pointer_takes_first() {
        let mut tours = seed_tours();
        tours.reverse();
        assert_eq!(select_featured(&tours, "deleted-long-ago").id, "jeju-402");
    }

    #[test]
    fn test_empty_list_uses_builtin_default() {
        assert_eq!(select_featured(&[], "busan-429"), default_tour());
        assert_eq!(select_featured(&[], ""), default_tour());
    }
}
