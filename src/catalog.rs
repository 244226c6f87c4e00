use serde::{Deserialize, Serialize};

use crate::models::Service;

pub const CATEGORIES: [&str; 12] = [
    "Adventure",
    "Wildlife",
    "Hiking",
    "City Tour",
    "Water Sports",
    "Cultural",
    "Beach & Relaxation",
    "Photography",
    "Food & Culinary",
    "Wellness & Spa",
    "Historical Sites",
    "Nature & Eco",
];

pub const PROVINCES: [&str; 9] = [
    "Western Province",
    "Central Province",
    "Southern Province",
    "Northern Province",
    "Eastern Province",
    "North Western Province",
    "North Central Province",
    "Uva Province",
    "Sabaragamuwa Province",
];

#[derive(Debug, Serialize, Clone, Copy)]
pub struct Interest {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const INTERESTS: [Interest; 12] = [
    Interest { id: "Adventure", name: "Adventure", icon: "🏔️" },
    Interest { id: "Wildlife", name: "Wildlife", icon: "🦁" },
    Interest { id: "Hiking", name: "Hiking", icon: "🥾" },
    Interest { id: "City Tour", name: "City Tour", icon: "🏙️" },
    Interest { id: "Water Sports", name: "Water Sports", icon: "🏄" },
    Interest { id: "Cultural", name: "Cultural", icon: "🕌" },
    Interest { id: "Beach & Relaxation", name: "Beach & Relaxation", icon: "🏖️" },
    Interest { id: "Photography", name: "Photography", icon: "📸" },
    Interest { id: "Food & Culinary", name: "Food & Culinary", icon: "🍛" },
    Interest { id: "Wellness & Spa", name: "Wellness & Spa", icon: "🧘" },
    Interest { id: "Historical Sites", name: "Historical Sites", icon: "🏛️" },
    Interest { id: "Nature & Eco", name: "Nature & Eco", icon: "🌿" },
];

pub fn cities_for(province: &str) -> &'static [&'static str] {
    match province {
        "Western Province" => &["Colombo", "Gampaha", "Kalutara", "Negombo", "Mount Lavinia"],
        "Central Province" => &["Kandy", "Matale", "Nuwara Eliya", "Dambulla"],
        "Southern Province" => &["Galle", "Matara", "Hambantota", "Mirissa", "Tangalle"],
        "Northern Province" => &["Jaffna", "Kilinochchi", "Mannar", "Vavuniya"],
        "Eastern Province" => &["Trincomalee", "Batticaloa", "Ampara"],
        "North Western Province" => &["Kurunegala", "Puttalam", "Chilaw"],
        "North Central Province" => &["Anuradhapura", "Polonnaruwa"],
        "Uva Province" => &["Badulla", "Monaragala", "Ella", "Bandarawela"],
        "Sabaragamuwa Province" => &["Ratnapura", "Kegalle"],
        _ => &[],
    }
}

pub fn districts_for(city: &str) -> Vec<String> {
    let city = city.trim();
    if city.is_empty() {
        return Vec::new();
    }
    ["Central", "North", "South", "East", "West"]
        .iter()
        .map(|side| format!("{} {}", city, side))
        .collect()
}

pub fn is_interest(id: &str) -> bool {
    INTERESTS.iter().any(|i| i.id == id)
}

/// Search box and dropdowns of the all-services page. `all` or empty disables a dropdown.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ServiceFilter {
    pub q: Option<String>,
    pub province: Option<String>,
    pub category: Option<String>,
}

fn selected(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty() && *v != "all")
}

impl ServiceFilter {
    pub fn matches(&self, service: &Service) -> bool {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = service.title.to_lowercase().contains(&q)
                || service.description.to_lowercase().contains(&q)
                || service.city.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        if let Some(province) = selected(&self.province) {
            if !service.province.contains(province) {
                return false;
            }
        }
        if let Some(category) = selected(&self.category) {
            if service.category != category {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, services: Vec<Service>) -> Vec<Service> {
        services.into_iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DurationType;

    fn service(title: &str, city: &str, province: &str, category: &str) -> Service {
        Service {
            id: title.to_lowercase().replace(' ', "-"),
            provider_id: "p".into(),
            title: title.into(),
            description: format!("A tour around {}", city),
            category: category.into(),
            province: province.into(),
            city: city.into(),
            district: format!("{} Central", city),
            base_price: 40.0,
            adult_price: 45.0,
            child_price: None,
            max_group_size: 10,
            duration: 4.0,
            duration_type: DurationType::Hours,
            images: vec![],
            available_dates: vec![],
            time_slots: vec![],
            blocked_dates: vec![],
            status: "active".into(),
            created_at: String::new(),
        }
    }

    fn sample() -> Vec<Service> {
        vec![
            service("Sigiriya Rock Climb", "Dambulla", "Central Province", "Adventure"),
            service("Kandy Temple Walk", "Kandy", "Central Province", "Cultural"),
            service("Whale Watching", "Mirissa", "Southern Province", "Water Sports"),
        ]
    }

    #[test]
    fn query_matches_title_description_or_city() {
        let filter = ServiceFilter { q: Some("KANDY".into()), ..Default::default() };
        let hits = filter.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Kandy Temple Walk");

        let filter = ServiceFilter { q: Some("mirissa".into()), ..Default::default() };
        assert_eq!(filter.apply(sample())[0].title, "Whale Watching");
    }

    #[test]
    fn all_disables_dropdown_filters() {
        let filter = ServiceFilter {
            q: None,
            province: Some("all".into()),
            category: Some("all".into()),
        };
        assert_eq!(filter.apply(sample()).len(), 3);
    }

    #[test]
    fn province_and_category_combine() {
        let filter = ServiceFilter {
            q: None,
            province: Some("Central".into()),
            category: Some("Cultural".into()),
        };
        let hits = filter.apply(sample());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].city, "Kandy");
    }

    #[test]
    fn districts_and_cities() {
        assert_eq!(districts_for("Galle")[0], "Galle Central");
        assert_eq!(districts_for("Galle").len(), 5);
        assert!(districts_for("  ").is_empty());
        assert!(cities_for("Uva Province").contains(&"Ella"));
        assert!(cities_for("Atlantis").is_empty());
        assert!(is_interest("Photography"));
        assert!(!is_interest("photography"));
    }
}
