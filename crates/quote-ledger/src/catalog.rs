//! Service catalog
//!
//! Every category carries its own sub-options, list prices and the set of
//! one-time options that are billed without the monthly suffix. Strings
//! coming from the form are turned into variants once, in [`Service::parse`].

use quote_types::{NewLineItem, VatRate};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Appended to the names of recurring services
pub const MONTHLY_SUFFIX: &str = " / το μήνα";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Website,
    LocalSeo,
    WebSeo,
    SocialMedia,
    Advertisement,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Website,
        Category::LocalSeo,
        Category::WebSeo,
        Category::SocialMedia,
        Category::Advertisement,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Website => "Website",
            Category::LocalSeo => "Local SEO",
            Category::WebSeo => "Web SEO",
            Category::SocialMedia => "Social Media",
            Category::Advertisement => "Advertisement",
        }
    }

    pub fn parse(label: &str) -> Result<Self, CatalogError> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == label)
            .ok_or_else(|| CatalogError::UnknownCategory(label.to_string()))
    }

    /// Labels of the fixed sub-options; empty for free-text categories
    pub fn sub_options(self) -> Vec<&'static str> {
        match self {
            Category::Website => WebsitePlan::ALL.iter().map(|p| p.label()).collect(),
            Category::LocalSeo => LocalSeoPlan::ALL.iter().map(|p| p.label()).collect(),
            Category::WebSeo => WebSeoPlan::ALL.iter().map(|p| p.label()).collect(),
            Category::SocialMedia => SocialMediaPack::ALL.iter().map(|p| p.label()).collect(),
            Category::Advertisement => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebsitePlan {
    Starter,
    Growth,
    EShop,
}

impl WebsitePlan {
    pub const ALL: [WebsitePlan; 3] = [
        WebsitePlan::Starter,
        WebsitePlan::Growth,
        WebsitePlan::EShop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WebsitePlan::Starter => "Ξεκίνημα",
            WebsitePlan::Growth => "Ανάπτυξη",
            WebsitePlan::EShop => "E-shop",
        }
    }

    pub fn list_price(self) -> f64 {
        match self {
            WebsitePlan::Starter => 400.0,
            WebsitePlan::Growth => 800.0,
            WebsitePlan::EShop => 1200.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalSeoPlan {
    Local,
    Community,
    Region,
    /// One-time setup fee, priced by hand
    InstallationCost,
}

impl LocalSeoPlan {
    pub const ALL: [LocalSeoPlan; 4] = [
        LocalSeoPlan::Local,
        LocalSeoPlan::Community,
        LocalSeoPlan::Region,
        LocalSeoPlan::InstallationCost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LocalSeoPlan::Local => "Τοπικό",
            LocalSeoPlan::Community => "Κοινότητα",
            LocalSeoPlan::Region => "Περιφέρεια",
            LocalSeoPlan::InstallationCost => "Κόστος Εγκατάστασης",
        }
    }

    pub fn list_price(self) -> Option<f64> {
        match self {
            LocalSeoPlan::Local => Some(200.0),
            LocalSeoPlan::Community => Some(299.0),
            LocalSeoPlan::Region => Some(349.0),
            LocalSeoPlan::InstallationCost => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        !matches!(self, LocalSeoPlan::InstallationCost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebSeoPlan {
    Basic,
    Growth,
    Authority,
    /// One-time audit
    Audit,
}

impl WebSeoPlan {
    pub const ALL: [WebSeoPlan; 4] = [
        WebSeoPlan::Basic,
        WebSeoPlan::Growth,
        WebSeoPlan::Authority,
        WebSeoPlan::Audit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WebSeoPlan::Basic => "Βασικό",
            WebSeoPlan::Growth => "Ανάπτυξη",
            WebSeoPlan::Authority => "Εξουσία",
            WebSeoPlan::Audit => "Seo Audit",
        }
    }

    pub fn list_price(self) -> f64 {
        match self {
            WebSeoPlan::Basic => 300.0,
            WebSeoPlan::Growth => 399.0,
            WebSeoPlan::Authority => 700.0,
            WebSeoPlan::Audit => 100.0,
        }
    }

    pub fn is_recurring(self) -> bool {
        !matches!(self, WebSeoPlan::Audit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SocialMediaPack {
    StarterVideo,
    GrowthVideo,
    PerformanceVideo,
    EditOnly,
}

impl SocialMediaPack {
    pub const ALL: [SocialMediaPack; 4] = [
        SocialMediaPack::StarterVideo,
        SocialMediaPack::GrowthVideo,
        SocialMediaPack::PerformanceVideo,
        SocialMediaPack::EditOnly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SocialMediaPack::StarterVideo => "Starter Video Pack",
            SocialMediaPack::GrowthVideo => "Growth Video Pack",
            SocialMediaPack::PerformanceVideo => "Performance Video Pack",
            SocialMediaPack::EditOnly => "Edit Only Pack",
        }
    }

    pub fn list_price(self) -> f64 {
        match self {
            SocialMediaPack::StarterVideo => 390.0,
            SocialMediaPack::GrowthVideo => 690.0,
            SocialMediaPack::PerformanceVideo => 990.0,
            SocialMediaPack::EditOnly => 290.0,
        }
    }
}

/// A fully specified service selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", content = "option")]
pub enum Service {
    Website(WebsitePlan),
    LocalSeo(LocalSeoPlan),
    WebSeo(WebSeoPlan),
    SocialMedia(SocialMediaPack),
    /// Free-text package description entered by the user
    Advertisement(String),
}

impl Service {
    /// Resolve form strings into a catalog entry
    pub fn parse(category: &str, sub_option: &str) -> Result<Self, CatalogError> {
        let category = Category::parse(category)?;
        let option = sub_option.trim();

        if option.is_empty() {
            return Err(match category {
                Category::Advertisement => CatalogError::MissingPackage,
                other => CatalogError::MissingSubOption(other.label()),
            });
        }

        let unknown = || CatalogError::UnknownSubOption {
            category: category.label().to_string(),
            option: option.to_string(),
        };

        let service = match category {
            Category::Website => Service::Website(
                find_option(&WebsitePlan::ALL, WebsitePlan::label, option).ok_or_else(unknown)?,
            ),
            Category::LocalSeo => Service::LocalSeo(
                find_option(&LocalSeoPlan::ALL, LocalSeoPlan::label, option).ok_or_else(unknown)?,
            ),
            Category::WebSeo => Service::WebSeo(
                find_option(&WebSeoPlan::ALL, WebSeoPlan::label, option).ok_or_else(unknown)?,
            ),
            Category::SocialMedia => Service::SocialMedia(
                find_option(&SocialMediaPack::ALL, SocialMediaPack::label, option)
                    .ok_or_else(unknown)?,
            ),
            Category::Advertisement => Service::Advertisement(option.to_string()),
        };
        Ok(service)
    }

    pub fn category(&self) -> Category {
        match self {
            Service::Website(_) => Category::Website,
            Service::LocalSeo(_) => Category::LocalSeo,
            Service::WebSeo(_) => Category::WebSeo,
            Service::SocialMedia(_) => Category::SocialMedia,
            Service::Advertisement(_) => Category::Advertisement,
        }
    }

    pub fn option_label(&self) -> &str {
        match self {
            Service::Website(plan) => plan.label(),
            Service::LocalSeo(plan) => plan.label(),
            Service::WebSeo(plan) => plan.label(),
            Service::SocialMedia(pack) => pack.label(),
            Service::Advertisement(package) => package.as_str(),
        }
    }

    /// Whether the service is billed monthly
    pub fn is_recurring(&self) -> bool {
        match self {
            Service::Website(_) | Service::Advertisement(_) => false,
            Service::LocalSeo(plan) => plan.is_recurring(),
            Service::WebSeo(plan) => plan.is_recurring(),
            Service::SocialMedia(_) => true,
        }
    }

    /// Price suggested by the catalog, if the option has one
    pub fn list_price(&self) -> Option<f64> {
        match self {
            Service::Website(plan) => Some(plan.list_price()),
            Service::LocalSeo(plan) => plan.list_price(),
            Service::WebSeo(plan) => Some(plan.list_price()),
            Service::SocialMedia(pack) => Some(pack.list_price()),
            Service::Advertisement(_) => None,
        }
    }

    /// `<Category> - <Option>`, plus the monthly suffix for recurring services
    pub fn item_name(&self) -> String {
        let mut name = format!("{} - {}", self.category().label(), self.option_label());
        if self.is_recurring() {
            name.push_str(MONTHLY_SUFFIX);
        }
        name
    }

    /// Prepare ledger input for this service
    pub fn line_item(&self, unit_price: f64, vat_rate: VatRate, discount_rate: f64) -> NewLineItem {
        NewLineItem::new(self.item_name(), unit_price)
            .with_vat(vat_rate)
            .with_discount(discount_rate)
    }
}

fn find_option<T: Copy>(all: &[T], label: fn(T) -> &'static str, option: &str) -> Option<T> {
    all.iter().copied().find(|candidate| label(*candidate) == option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_local_seo_recurring_gets_suffix() {
        let service = Service::parse("Local SEO", "Τοπικό").unwrap();
        let name = service.item_name();
        assert_eq!(name, "Local SEO - Τοπικό / το μήνα");
        assert!(name.ends_with(MONTHLY_SUFFIX));
    }

    #[test]
    fn test_local_seo_installation_has_no_suffix() {
        let service = Service::parse("Local SEO", "Κόστος Εγκατάστασης").unwrap();
        let name = service.item_name();
        assert_eq!(name, "Local SEO - Κόστος Εγκατάστασης");
        assert!(!name.ends_with(MONTHLY_SUFFIX));
        assert_eq!(service.list_price(), None);
    }

    #[test]
    fn test_web_seo_audit_is_one_time() {
        let audit = Service::parse("Web SEO", "Seo Audit").unwrap();
        assert_eq!(audit.item_name(), "Web SEO - Seo Audit");
        assert_eq!(audit.list_price(), Some(100.0));

        let basic = Service::parse("Web SEO", "Βασικό").unwrap();
        assert_eq!(basic.item_name(), "Web SEO - Βασικό / το μήνα");
    }

    #[test]
    fn test_social_media_always_recurring() {
        for pack in SocialMediaPack::ALL {
            assert!(Service::SocialMedia(pack).item_name().ends_with(MONTHLY_SUFFIX));
        }
    }

    #[test]
    fn test_website_and_advertisement_are_one_time() {
        let website = Service::parse("Website", "E-shop").unwrap();
        assert_eq!(website.item_name(), "Website - E-shop");
        assert_eq!(website.list_price(), Some(1200.0));

        let ad = Service::parse("Advertisement", "  Google Ads 3 μήνες ").unwrap();
        assert_eq!(ad.item_name(), "Advertisement - Google Ads 3 μήνες");
        assert_eq!(ad.list_price(), None);
    }

    #[test]
    fn test_same_label_resolves_per_category() {
        assert_eq!(
            Service::parse("Website", "Ανάπτυξη").unwrap(),
            Service::Website(WebsitePlan::Growth)
        );
        assert_eq!(
            Service::parse("Web SEO", "Ανάπτυξη").unwrap(),
            Service::WebSeo(WebSeoPlan::Growth)
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Service::parse("Hosting", "x").unwrap_err(),
            CatalogError::UnknownCategory("Hosting".to_string())
        );
        assert_eq!(
            Service::parse("Website", "").unwrap_err(),
            CatalogError::MissingSubOption("Website")
        );
        assert_eq!(
            Service::parse("Advertisement", "  ").unwrap_err(),
            CatalogError::MissingPackage
        );
        assert!(matches!(
            Service::parse("Local SEO", "Εξουσία"),
            Err(CatalogError::UnknownSubOption { .. })
        ));
    }

    #[test]
    fn test_sub_options_listing() {
        assert_eq!(
            Category::LocalSeo.sub_options(),
            vec!["Τοπικό", "Κοινότητα", "Περιφέρεια", "Κόστος Εγκατάστασης"]
        );
        assert!(Category::Advertisement.sub_options().is_empty());
    }

    #[test]
    fn test_line_item_uses_composed_name() {
        let item = Service::SocialMedia(SocialMediaPack::EditOnly).line_item(
            290.0,
            VatRate::STANDARD,
            0.0,
        );
        assert_eq!(item.name, "Social Media - Edit Only Pack / το μήνα");
        assert_eq!(item.vat_rate, Some(VatRate::STANDARD));
    }
}
