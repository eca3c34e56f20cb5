//! Askama templates for the web frontend.

use askama::Template;

use crate::domain::{Booking, MAX_STARS, Shop, StarFill, star_fills};
use crate::listing::ShopCard;

/// Weekday abbreviations, indexed from Sunday.
const WEEKDAY_LABELS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// Shown when a shop lists trading days but none of them is valid.
const NO_DAYS_LABEL: &str = "sem dias de abertura";

// ============================================================================
// Page Templates (extend base.html)
// ============================================================================

/// A list of shop cards: the home listing or the favorites page.
#[derive(Template)]
#[template(path = "shop_list.html")]
pub struct ShopListTemplate {
    pub title: String,
    pub empty_message: String,
    pub shops: Vec<ShopCardView>,
}

/// Shop detail page.
#[derive(Template)]
#[template(path = "shop_detail.html")]
pub struct ShopDetailTemplate {
    pub shop: ShopDetailView,
}

/// The user's bookings.
#[derive(Template)]
#[template(path = "bookings.html")]
pub struct BookingListTemplate {
    pub bookings: Vec<BookingView>,
}

// ============================================================================
// View Models (for templates)
// ============================================================================

/// Shop card view model.
#[derive(Debug, Clone)]
pub struct ShopCardView {
    pub slug: String,
    pub name: String,
    pub neighborhood: Option<String>,
    pub image_url: Option<String>,
    pub is_open: bool,
    pub distance_label: String,
    /// `None` until the shop has enough ratings
    pub average_label: Option<String>,
    pub count_label: String,
    /// CSS class per star: "full", "half" or "empty"
    pub stars: Vec<&'static str>,
}

impl ShopCardView {
    pub fn from_card(card: &ShopCard<'_>) -> Self {
        let shop = card.shop;
        let rating = &shop.rating;
        Self {
            slug: shop.slug.to_string(),
            name: shop.name.clone(),
            neighborhood: shop.neighborhood.clone(),
            image_url: shop.image_url.clone(),
            is_open: card.is_open,
            distance_label: card.distance_label.clone(),
            average_label: rating.shows_stars().then(|| rating.average_label()),
            count_label: rating.count_label(),
            stars: star_classes(rating.average),
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_open { "Aberto" } else { "Fechado" }
    }
}

/// Shop detail view model.
#[derive(Debug, Clone)]
pub struct ShopDetailView {
    pub id: String,
    pub card: ShopCardView,
    pub address: Option<String>,
    /// e.g. "08:00 - 20:00", or `None` when the shop has no hours
    pub hours_label: Option<String>,
    /// e.g. "Seg, Ter, Qua"; `None` when the shop opens every day
    pub days_label: Option<String>,
    pub gallery: Vec<String>,
    pub services: Vec<ServiceView>,
    /// `None` for anonymous visitors
    pub is_favorite: Option<bool>,
    pub directions_url: String,
}

impl ShopDetailView {
    pub fn new(card: &ShopCard<'_>, is_favorite: Option<bool>, directions_url: String) -> Self {
        let shop: &Shop = card.shop;
        let hours_label = match (shop.opening_time.as_deref(), shop.closing_time.as_deref()) {
            (Some(open), Some(close)) => {
                Some(format!("{} - {}", trim_seconds(open), trim_seconds(close)))
            }
            _ => None,
        };
        let days_label = (!shop.opening_days.is_unrestricted()).then(|| {
            let days = shop.opening_days.indices();
            if days.is_empty() {
                return NO_DAYS_LABEL.to_string();
            }
            days.iter()
                .map(|&d| WEEKDAY_LABELS[usize::from(d)])
                .collect::<Vec<_>>()
                .join(", ")
        });

        Self {
            id: shop.id.to_string(),
            card: ShopCardView::from_card(card),
            address: shop.address.clone(),
            hours_label,
            days_label,
            gallery: shop.gallery.images().to_vec(),
            services: shop.services.iter().map(ServiceView::from_service).collect(),
            is_favorite,
            directions_url,
        }
    }

    pub fn signed_in(&self) -> bool {
        self.is_favorite.is_some()
    }

    pub fn favorite(&self) -> bool {
        self.is_favorite == Some(true)
    }
}

/// Service view model.
#[derive(Debug, Clone)]
pub struct ServiceView {
    pub name: String,
    pub price_label: Option<String>,
    pub duration_label: Option<String>,
}

impl ServiceView {
    fn from_service(service: &crate::domain::ShopService) -> Self {
        Self {
            name: service.name.clone(),
            price_label: service.price.map(|p| format!("{p:.0} MT")),
            duration_label: service.duration_mins.map(|d| format!("{d} min")),
        }
    }
}

/// Booking view model.
#[derive(Debug, Clone)]
pub struct BookingView {
    pub service_name: String,
    pub date: String,
    pub time: String,
    pub status: &'static str,
}

impl BookingView {
    pub fn from_booking(booking: &Booking) -> Self {
        Self {
            service_name: booking.service_name.clone(),
            date: booking.date.format("%d/%m/%Y").to_string(),
            time: booking.time.to_string(),
            status: booking.status.as_str(),
        }
    }
}

fn star_classes(average: f64) -> Vec<&'static str> {
    star_fills(average, MAX_STARS)
        .into_iter()
        .map(|fill| match fill {
            StarFill::Full => "full",
            StarFill::Half => "half",
            StarFill::Empty => "empty",
        })
        .collect()
}

/// "08:00:00" -> "08:00"; anything else is shown as stored.
fn trim_seconds(time: &str) -> &str {
    if time.len() == 8 && time.as_bytes()[5] == b':' {
        time.get(..5).unwrap_or(time)
    } else {
        time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Availability, OpeningDays, RatingSummary, fixtures};
    use crate::listing::ListingConfig;

    fn card_view(shop: &Shop) -> ShopCardView {
        let card = ShopCard::build(shop, None, &Availability::default(), &ListingConfig::default());
        ShopCardView::from_card(&card)
    }

    #[test]
    fn stars_hidden_below_threshold() {
        let mut shop = fixtures::shop("central");
        shop.rating = RatingSummary::new(5.0, 2);
        let view = card_view(&shop);
        assert_eq!(view.average_label, None);
        assert_eq!(view.count_label, "2 avaliações");

        shop.rating = RatingSummary::new(4.5, 3);
        let view = card_view(&shop);
        assert_eq!(view.average_label.as_deref(), Some("4.5"));
        assert_eq!(view.stars, vec!["full", "full", "full", "full", "half"]);
    }

    #[test]
    fn detail_labels() {
        let mut shop = fixtures::shop("central");
        shop.opening_time = Some("08:00:00".to_string());
        let card = ShopCard::build(&shop, None, &Availability::default(), &ListingConfig::default());
        let view = ShopDetailView::new(&card, None, String::new());

        assert_eq!(view.hours_label.as_deref(), Some("08:00 - 20:00"));
        assert_eq!(view.days_label.as_deref(), Some("Seg, Ter, Qua, Qui, Sex"));

        shop.opening_days = OpeningDays::default();
        shop.closing_time = None;
        let card = ShopCard::build(&shop, None, &Availability::default(), &ListingConfig::default());
        let view = ShopDetailView::new(&card, None, String::new());
        assert_eq!(view.hours_label, None);
        assert_eq!(view.days_label, None);

        shop.opening_days = OpeningDays::from_indices([7]);
        let card = ShopCard::build(&shop, None, &Availability::default(), &ListingConfig::default());
        let view = ShopDetailView::new(&card, None, String::new());
        assert_eq!(view.days_label.as_deref(), Some(NO_DAYS_LABEL));
    }

    #[test]
    fn trim_seconds_only_strips_valid_suffix() {
        assert_eq!(trim_seconds("08:00:00"), "08:00");
        assert_eq!(trim_seconds("8:00"), "8:00");
        assert_eq!(trim_seconds("garbage!"), "garbage!");
    }

    #[test]
    fn list_template_renders() {
        let shop = fixtures::shop("central");
        let html = ShopListTemplate {
            title: "Barbearias".to_string(),
            empty_message: "Nada".to_string(),
            shops: vec![card_view(&shop)],
        }
        .render()
        .unwrap();
        assert!(html.contains("/shops/central"));
        assert!(html.contains("Barbearia Central"));
    }

    #[test]
    fn empty_list_shows_message() {
        let html = ShopListTemplate {
            title: "Favoritos".to_string(),
            empty_message: "Ainda sem favoritos".to_string(),
            shops: vec![],
        }
        .render()
        .unwrap();
        assert!(html.contains("Ainda sem favoritos"));
    }
}
