use serde::{Deserialize, Serialize};

/// An operating region a sales location belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub zip_codes: Vec<String>,
}

/// A sales lot where inventory is displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Location {
    /// Returns `true` if any of this location's regions has the given slug.
    #[must_use]
    pub fn in_region(&self, region_slug: &str) -> bool {
        self.regions.iter().any(|r| r.slug == region_slug)
    }
}

/// The building model an inventory item was built from.
///
/// Field names follow the CMS payload, which keeps product data snake-cased.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub product_line_slug: Option<String>,
    #[serde(default)]
    pub product_line_title: Option<String>,
    #[serde(default)]
    pub product_category_slug: Option<String>,
    #[serde(default)]
    pub product_category_title: Option<String>,
    #[serde(default)]
    pub discontinued: bool,
}

/// A fully described building on a sales lot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub serial_number: String,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub product: Option<Product>,
    /// Footprint as entered by the lot, usually `"<W>x<L>"` in feet.
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub used_building: bool,
    #[serde(default)]
    pub cash_price: Option<f64>,
    #[serde(default)]
    pub discount_amount: Option<f64>,
    #[serde(default)]
    pub roof_color: Option<String>,
    #[serde(default)]
    pub siding_color: Option<String>,
    #[serde(default)]
    pub trim_color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub highlighted_label: Option<String>,
    #[serde(default)]
    pub highlighted_description: Option<String>,
    #[serde(default)]
    pub designer_link: Option<String>,
}

/// A catalog slot that has not been fully entered yet. It is always shown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderItem {
    pub serial_number: String,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub size: Option<String>,
}

/// One entry of the inventory collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogItem {
    Item(InventoryItem),
    Placeholder(PlaceholderItem),
}

impl CatalogItem {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, CatalogItem::Placeholder(_))
    }

    #[must_use]
    pub fn serial_number(&self) -> &str {
        match self {
            CatalogItem::Item(item) => &item.serial_number,
            CatalogItem::Placeholder(p) => &p.serial_number,
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            CatalogItem::Item(item) => item.location.as_ref(),
            CatalogItem::Placeholder(p) => p.location.as_ref(),
        }
    }

    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            CatalogItem::Item(item) => item.product.as_ref(),
            CatalogItem::Placeholder(p) => p.product.as_ref(),
        }
    }

    #[must_use]
    pub fn size(&self) -> Option<&str> {
        match self {
            CatalogItem::Item(item) => item.size.as_deref(),
            CatalogItem::Placeholder(p) => p.size.as_deref(),
        }
    }

    /// Cash price, with a missing price reading as zero.
    #[must_use]
    pub fn price(&self) -> f64 {
        self.as_item().and_then(|i| i.cash_price).unwrap_or(0.0)
    }

    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.as_item()
            .and_then(|i| i.discount_amount)
            .unwrap_or(0.0)
            > 0.0
    }

    #[must_use]
    pub fn is_used(&self) -> bool {
        self.as_item().is_some_and(|i| i.used_building)
    }

    /// The highlighted label, trimmed. Empty labels read as none.
    #[must_use]
    pub fn highlighted_label(&self) -> Option<&str> {
        self.as_item()
            .and_then(|i| i.highlighted_label.as_deref())
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }

    #[must_use]
    pub fn location_slug(&self) -> Option<&str> {
        self.location().map(|l| l.slug.as_str())
    }

    /// Returns `true` if the item's location belongs to the region.
    #[must_use]
    pub fn in_region(&self, region_slug: &str) -> bool {
        self.location().is_some_and(|l| l.in_region(region_slug))
    }

    /// Regions reachable through this item's location.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.location().into_iter().flat_map(|l| l.regions.iter())
    }

    #[must_use]
    pub fn as_item(&self) -> Option<&InventoryItem> {
        match self {
            CatalogItem::Item(item) => Some(item),
            CatalogItem::Placeholder(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(slug: &str) -> Region {
        Region {
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            zip_codes: vec![],
        }
    }

    #[test]
    fn deserializes_item_with_missing_optional_fields() {
        let json = r#"{
            "kind": "item",
            "serialNumber": "SN-100",
            "cashPrice": 4200.0,
            "location": { "slug": "lakeside", "title": "Lakeside", "regions": [
                { "slug": "coastal", "title": "Coastal" }
            ] }
        }"#;
        let item: CatalogItem = serde_json::from_str(json).expect("valid item json");
        assert!(!item.is_placeholder());
        assert_eq!(item.serial_number(), "SN-100");
        assert!(item.product().is_none());
        assert!((item.price() - 4200.0).abs() < f64::EPSILON);
        assert!(!item.is_discounted());
        assert_eq!(item.regions().count(), 1);
    }

    #[test]
    fn deserializes_placeholder() {
        let json = r#"{ "kind": "placeholder", "serialNumber": "PH-1" }"#;
        let item: CatalogItem = serde_json::from_str(json).expect("valid placeholder json");
        assert!(item.is_placeholder());
        assert!(item.price().abs() < f64::EPSILON);
        assert!(item.highlighted_label().is_none());
        assert_eq!(item.regions().count(), 0);
        assert!(!item.in_region("coastal"));
    }

    #[test]
    fn highlighted_label_is_trimmed() {
        let json = r#"{ "kind": "item", "serialNumber": "SN-2", "highlightedLabel": " sale " }"#;
        let item: CatalogItem = serde_json::from_str(json).expect("valid item json");
        assert_eq!(item.highlighted_label(), Some("sale"));

        let blank = r#"{ "kind": "item", "serialNumber": "SN-3", "highlightedLabel": "  " }"#;
        let item: CatalogItem = serde_json::from_str(blank).expect("valid item json");
        assert!(item.highlighted_label().is_none());
    }

    #[test]
    fn discount_requires_positive_amount() {
        let mut item = InventoryItem {
            serial_number: "SN-1".to_string(),
            lot_number: None,
            location: None,
            product: None,
            size: None,
            used_building: false,
            cash_price: None,
            discount_amount: Some(0.0),
            roof_color: None,
            siding_color: None,
            trim_color: None,
            description: None,
            highlighted_label: None,
            highlighted_description: None,
            designer_link: None,
        };
        assert!(!CatalogItem::Item(item.clone()).is_discounted());
        item.discount_amount = Some(150.0);
        assert!(CatalogItem::Item(item).is_discounted());
    }

    #[test]
    fn location_in_region() {
        let location = Location {
            slug: "hilltop".to_string(),
            title: "Hilltop".to_string(),
            city: None,
            state: None,
            regions: vec![region("north"), region("south")],
        };
        assert!(location.in_region("south"));
        assert!(!location.in_region("east"));
    }
}
