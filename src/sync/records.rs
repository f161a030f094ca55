//! Field-name translation between content records and storage rows.

use super::{ColumnValue, ContentKind, StorageRow, SyncRecord};
use crate::errors::AppError;
use crate::models::{BlogPost, Testimonial, TourRecord, TourStatus, WhyChooseUsItem};

fn text(s: &str) -> ColumnValue {
    ColumnValue::Text(s.to_string())
}

impl SyncRecord for TourRecord {
    const KIND: ContentKind = ContentKind::Tours;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> StorageRow {
        StorageRow::new(&self.id)
            .with("title", text(&self.title))
            .with("destination", text(&self.destination))
            .with("departure_city", text(&self.departure_city))
            .with("departure_date", text(&self.departure_date))
            .with("description", text(&self.description))
            .with("image", text(&self.image))
            .with("itinerary_link", text(&self.itinerary_link))
            .with("status", text(self.status.as_str()))
            .with("is_full", ColumnValue::Bool(self.is_full))
            .with(
                "price",
                self.price.map(ColumnValue::Real).unwrap_or(ColumnValue::Null),
            )
    }

    fn from_row(row: &StorageRow) -> Result<Self, AppError> {
        let status = row.text("status")?;
        Ok(TourRecord {
            id: row.id.clone(),
            title: row.text("title")?,
            destination: row.text("destination")?,
            departure_city: row.text("departure_city")?,
            departure_date: row.text("departure_date")?,
            description: row.text("description")?,
            image: row.text("image")?,
            itinerary_link: row.text("itinerary_link")?,
            status: TourStatus::from_str(&status).unwrap_or_default(),
            is_full: row.boolean("is_full")?,
            price: row.optional_real("price")?,
        })
    }

    fn seed() -> Vec<Self> {
        crate::catalog::seed_tours()
    }
}

impl SyncRecord for BlogPost {
    const KIND: ContentKind = ContentKind::BlogPosts;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> StorageRow {
        StorageRow::new(&self.id)
            .with("title", text(&self.title))
            .with("content", text(&self.content))
            .with("category", text(&self.category))
            .with("image", text(&self.image))
            .with("publish_date", text(&self.publish_date))
    }

    fn from_row(row: &StorageRow) -> Result<Self, AppError> {
        Ok(BlogPost {
            id: row.id.clone(),
            title: row.text("title")?,
            content: row.text("content")?,
            category: row.text("category")?,
            image: row.text("image")?,
            publish_date: row.text("publish_date")?,
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Blog post title is required".to_string()));
        }
        Ok(())
    }
}

impl SyncRecord for Testimonial {
    const KIND: ContentKind = ContentKind::Testimonials;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> StorageRow {
        StorageRow::new(&self.id)
            .with("name", text(&self.name))
            .with("tour_name", text(&self.tour_name))
            .with("quote", text(&self.quote))
            .with("image", text(&self.image))
            .with("rating", ColumnValue::Integer(self.rating))
    }

    fn from_row(row: &StorageRow) -> Result<Self, AppError> {
        Ok(Testimonial {
            id: row.id.clone(),
            name: row.text("name")?,
            tour_name: row.text("tour_name")?,
            quote: row.text("quote")?,
            image: row.text("image")?,
            rating: row.integer("rating")?,
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Testimonial name is required".to_string()));
        }
        if !(1..=5).contains(&self.rating) {
            return Err(AppError::Validation(format!(
                "Rating must be between 1 and 5, got {}",
                self.rating
            )));
        }
        Ok(())
    }
}

impl SyncRecord for WhyChooseUsItem {
    const KIND: ContentKind = ContentKind::WhyChooseUs;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self) -> StorageRow {
        StorageRow::new(&self.id)
            .with("title", text(&self.title))
            .with("description", text(&self.description))
            .with("icon", text(&self.icon))
    }

    fn from_row(row: &StorageRow) -> Result<Self, AppError> {
        Ok(WhyChooseUsItem {
            id: row.id.clone(),
            title: row.text("title")?,
            description: row.text("description")?,
            icon: row.text("icon")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tour_columns_are_snake_case_and_complete() {
        let tour = TourRecord {
            price: Some(32900.0),
            ..crate::catalog::default_tour()
        };
        let row = tour.to_row();

        let names: Vec<&str> = row.columns.iter().map(|(n, _)| *n).collect();
        let schema: Vec<&str> = ContentKind::Tours.columns().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, schema);
        assert_eq!(row.get("departure_city"), Some(&text(&tour.departure_city)));
        assert_eq!(row.get("itinerary_link"), Some(&text(&tour.itinerary_link)));

        assert_eq!(TourRecord::from_row(&row).unwrap(), tour);
    }

    #[test]
    fn test_every_kind_matches_its_schema() {
        let post = BlogPost {
            id: "p1".into(),
            title: "Packing for Korea".into(),
            content: "Layers.".into(),
            category: "tips".into(),
            image: String::new(),
            publish_date: "2026-01-05".into(),
        };
        let review = Testimonial {
            id: "r1".into(),
            name: "Amy".into(),
            tour_name: "Jeju".into(),
            quote: "Lovely".into(),
            image: String::new(),
            rating: 5,
        };
        let point = WhyChooseUsItem {
            id: "w1".into(),
            title: "Guided by Sunny".into(),
            description: String::new(),
            icon: "smile".into(),
        };

        for (kind, row) in [
            (ContentKind::BlogPosts, post.to_row()),
            (ContentKind::Testimonials, review.to_row()),
            (ContentKind::WhyChooseUs, point.to_row()),
        ] {
            let names: Vec<&str> = row.columns.iter().map(|(n, _)| *n).collect();
            let schema: Vec<&str> = kind.columns().iter().map(|(n, _)| *n).collect();
            assert_eq!(names, schema, "{:?}", kind);
        }
        assert_eq!(review.to_row().get("tour_name"), Some(&text("Jeju")));
        assert_eq!(BlogPost::from_row(&post.to_row()).unwrap(), post);
    }

    #[test]
    fn test_unknown_status_falls_back_to_upcoming() {
        let mut row = crate::catalog::default_tour().to_row();
        for (name, value) in row.columns.iter_mut() {
            if *name == "status" {
                *value = text("cancelled");
            }
        }
        assert_eq!(TourRecord::from_row(&row).unwrap().status, TourStatus::Upcoming);
    }

    #[test]
    fn test_testimonial_rating_validation() {
        let mut review = Testimonial {
            id: "r1".into(),
            name: "Amy".into(),
            tour_name: String::new(),
            quote: String::new(),
            image: String::new(),
            rating: 0,
        };
        assert!(matches!(review.validate(), Err(AppError::Validation(_))));
        review.rating = 4;
        assert!(review.validate().is_ok());
    }
}
