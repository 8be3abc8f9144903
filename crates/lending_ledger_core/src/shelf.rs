//! crates/lending_ledger_core/src/shelf.rs
//!
//! Member-owned extras around the catalog: star ratings with an optional
//! review, and personal categories that group books under a coloured label.

use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{Category, Review};
use crate::ledger::{LedgerError, LedgerResult};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Label shown next to a star rating.
pub fn rating_label(rating: u8) -> Option<&'static str> {
    match rating {
        1 => Some("Poor"),
        2 => Some("Fair"),
        3 => Some("Good"),
        4 => Some("Very Good"),
        5 => Some("Excellent"),
        _ => None,
    }
}

//=========================================================================================
// Reviews
//=========================================================================================

/// Every review, in the order each (member, book) pair first reviewed.
#[derive(Debug, Default)]
pub struct ReviewBook {
    reviews: Vec<Review>,
}

impl ReviewBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `user_id`'s rating of `book_id`. A second submission replaces
    /// the rating, text and date but keeps the review id.
    pub fn submit(
        &mut self,
        user_id: Uuid,
        book_id: Uuid,
        rating: u8,
        text: &str,
        today: NaiveDate,
    ) -> LedgerResult<&Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            warn!(user_id = %user_id, book_id = %book_id, rating, "Rejected review rating");
            return Err(LedgerError::InvalidRating(rating));
        }

        let index = match self
            .reviews
            .iter()
            .position(|r| r.user_id == user_id && r.book_id == book_id)
        {
            Some(index) => index,
            None => {
                self.reviews.push(Review {
                    id: Uuid::new_v4(),
                    book_id,
                    user_id,
                    rating,
                    text: String::new(),
                    date: today,
                });
                self.reviews.len() - 1
            }
        };

        let review = &mut self.reviews[index];
        review.rating = rating;
        review.text = text.trim().to_string();
        review.date = today;
        info!(user_id = %user_id, book_id = %book_id, rating, "Review recorded");
        Ok(review)
    }

    pub fn reviews_for(&self, book_id: Uuid) -> Vec<&Review> {
        self.reviews.iter().filter(|r| r.book_id == book_id).collect()
    }

    pub fn review_by(&self, user_id: Uuid, book_id: Uuid) -> Option<&Review> {
        self.reviews
            .iter()
            .find(|r| r.user_id == user_id && r.book_id == book_id)
    }

    /// Mean star rating for `book_id`, or 0 when nobody has rated it.
    pub fn average_rating(&self, book_id: Uuid) -> f64 {
        let ratings: Vec<f64> = self
            .reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .map(|r| f64::from(r.rating))
            .collect();
        if ratings.is_empty() {
            return 0.0;
        }
        ratings.iter().sum::<f64>() / ratings.len() as f64
    }
}

//=========================================================================================
// Categories
//=========================================================================================

/// Colours offered when creating a category. The first one is the default.
pub const PRESET_COLORS: [&str; 10] = [
    "#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#6366F1", "#8B5CF6", "#EC4899", "#14B8A6",
    "#F97316", "#84CC16",
];

/// Each member's categories, in creation order.
#[derive(Debug, Default)]
pub struct CategoryShelf {
    categories: HashMap<Uuid, Vec<Category>>,
}

impl CategoryShelf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories_for(&self, user_id: Uuid) -> &[Category] {
        self.categories.get(&user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Creates a category. The name is trimmed and must not be empty; a
    /// missing colour falls back to the first preset.
    pub fn add(&mut self, user_id: Uuid, name: &str, color: Option<&str>) -> LedgerResult<&Category> {
        let name = category_name(name)?;
        let color = match color {
            Some(color) => category_color(color)?,
            None => PRESET_COLORS[0].to_string(),
        };
        let categories = self.categories.entry(user_id).or_default();
        categories.push(Category {
            id: Uuid::new_v4(),
            name,
            color,
            book_ids: Vec::new(),
        });
        let category = &categories[categories.len() - 1];
        info!(user_id = %user_id, category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Renames a category and, when `color` is given, recolours it.
    pub fn edit(
        &mut self,
        user_id: Uuid,
        category_id: Uuid,
        name: &str,
        color: Option<&str>,
    ) -> LedgerResult<&Category> {
        let name = category_name(name)?;
        let color = color.map(category_color).transpose()?;
        let category = self.category_mut(user_id, category_id)?;
        category.name = name;
        if let Some(color) = color {
            category.color = color;
        }
        info!(user_id = %user_id, category_id = %category_id, "Category updated");
        Ok(category)
    }

    pub fn delete(&mut self, user_id: Uuid, category_id: Uuid) -> LedgerResult<Category> {
        let categories = self
            .categories
            .get_mut(&user_id)
            .ok_or_else(|| category_not_found(category_id))?;
        let index = categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| category_not_found(category_id))?;
        let removed = categories.remove(index);
        info!(user_id = %user_id, category_id = %category_id, "Category deleted");
        Ok(removed)
    }

    /// Files `book_id` under the category. Filing the same book twice is a no-op.
    pub fn assign_book(&mut self, user_id: Uuid, category_id: Uuid, book_id: Uuid) -> LedgerResult<&Category> {
        let category = self.category_mut(user_id, category_id)?;
        if !category.book_ids.contains(&book_id) {
            category.book_ids.push(book_id);
        }
        Ok(category)
    }

    pub fn remove_book(&mut self, user_id: Uuid, category_id: Uuid, book_id: Uuid) -> LedgerResult<&Category> {
        let category = self.category_mut(user_id, category_id)?;
        category.book_ids.retain(|id| *id != book_id);
        Ok(category)
    }

    fn category_mut(&mut self, user_id: Uuid, category_id: Uuid) -> LedgerResult<&mut Category> {
        self.categories
            .get_mut(&user_id)
            .and_then(|categories| categories.iter_mut().find(|c| c.id == category_id))
            .ok_or_else(|| category_not_found(category_id))
    }
}

fn category_not_found(category_id: Uuid) -> LedgerError {
    LedgerError::NotFound(format!("Category {category_id} not found"))
}

fn category_name(name: &str) -> LedgerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidCategory("name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

/// Accepts `#RRGGBB` in either case and stores it upper-cased.
fn category_color(color: &str) -> LedgerResult<String> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(LedgerError::InvalidCategory(format!(
            "colour {color:?} is not of the form #RRGGBB"
        )));
    }
    Ok(color.to_ascii_uppercase())
}
