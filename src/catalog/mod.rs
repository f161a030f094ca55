//! Derived views over the tour list: filtering, the featured tour, the
//! departure countdown, and the admin editing operations.

mod countdown;
mod editor;
mod featured;
mod filter;

pub use countdown::*;
pub use editor::*;
pub use featured::*;
pub use filter::*;

use crate::models::{TourRecord, TourStatus};

/// The tours shipped with the site, used to seed an empty local store.
pub fn seed_tours() -> Vec<TourRecord> {
    vec![
        TourRecord {
            id: "busan-429".to_string(),
            title: "4/29 釜山+浦項+蔚山：美食美景團 5 天".to_string(),
            destination: "韓國釜山、浦項".to_string(),
            departure_city: "桃園".to_string(),
            departure_date: "2026-04-29".to_string(),
            description: "全新景點浦項 Space Walk，坐擁 360 度全景視野；走訪相生之手，感受虎尾岬的震撼自然之美。".to_string(),
            image: "/images/busan_city_coast.png".to_string(),
            itinerary_link: "https://drive.google.com/file/d/1OO4G_78YQ1H7rxPD7Z_VSivz3--ZJp4E/view".to_string(),
            status: TourStatus::Upcoming,
            is_full: false,
            price: None,
        },
        TourRecord {
            id: "jeju-304".to_string(),
            title: "3/4 濟州島海女遊艇美食團".to_string(),
            destination: "韓國濟州島".to_string(),
            departure_city: "桃園".to_string(),
            departure_date: "2026-03-04".to_string(),
            description: "深入濟州文化，體驗海女精神，盡享豪華遊艇與道地海鮮美食。".to_string(),
            image: "/images/jeju_ocean_yacht.png".to_string(),
            itinerary_link: "https://drive.google.com/file/d/1V9qyg61CJen2mQ-kYPDc7aVgwIHQA5ht/view".to_string(),
            status: TourStatus::Upcoming,
            is_full: false,
            price: None,
        },
        TourRecord {
            id: "jeju-402".to_string(),
            title: "4/2 濟州島賞櫻滿滿 5 天行程".to_string(),
            destination: "韓國濟州島".to_string(),
            departure_city: "桃園".to_string(),
            departure_date: "2026-04-02".to_string(),
            description: "沈浸在粉紅花海中！濟州最美櫻花季，精心安排五天極致賞櫻行程。".to_string(),
            image: "/images/default_scenery.png".to_string(),
            itinerary_link: "https://drive.google.com/file/d/1IU5YkRjwfGO2fh4pIajGzOSv4gLmASR0/view".to_string(),
            status: TourStatus::Upcoming,
            is_full: false,
            price: None,
        },
    ]
}

/// Built-in tour shown in the hero when there is nothing else to show.
pub fn default_tour() -> TourRecord {
    let mut seed = seed_tours();
    seed.swap_remove(0)
}
