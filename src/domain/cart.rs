use super::price::{Price, format_total};
use crate::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound of a cart total (10^24).
pub const MAX_TOTAL_AMOUNT: Decimal = Decimal::from_parts(2_701_131_776, 466_537_709, 54_210, false, 0);

/// A product as it is handed to the cart: everything a line needs except the
/// quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique key of the line.
    pub id: String,
    pub name: String,
    pub price: Price,
    /// Thumbnail reference.
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_private: Option<bool>,
}

/// One distinct product in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    /// Always at least 1 while the line lives in a [`Cart`].
    pub quantity: u32,
}

impl CartLine {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Unit price multiplied by quantity, `None` on overflow.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.item.price.amount().checked_mul(Decimal::from(self.quantity))
    }
}

/// Derived view over the cart lines. Never stored on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAggregate {
    /// Sum of all quantities.
    pub item_count: u64,
    /// Sum of subtotals, three decimals plus the unit label.
    pub total: String,
}

/// Ordered set of cart lines keyed by product id.
///
/// Lines keep insertion order. All operations uphold the line invariants: one
/// line per id, no line with a zero quantity, and a total no larger than
/// [`MAX_TOTAL_AMOUNT`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a cart from untrusted lines: zero-quantity lines are dropped and
    /// repeated ids are merged into the first occurrence.
    ///
    /// Lines priced in another unit than `unit`, or that would push the total
    /// out of range, are handed back instead of being added.
    pub fn from_lines(
        lines: impl IntoIterator<Item = CartLine>,
        unit: &str,
    ) -> (Self, Vec<CartLine>) {
        let mut cart = Self::new();
        let mut rejected = Vec::new();
        for line in lines {
            if line.item.price.unit() != unit {
                rejected.push(line);
                continue;
            }
            if cart.add(line.item.clone(), line.quantity).is_err() {
                rejected.push(line);
            }
        }
        (cart, rejected)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Adds `delta` units of `item`. An existing line is incremented in place,
    /// otherwise a new line starts at `delta`. A zero delta changes nothing.
    ///
    /// Fails without changing the cart when the line quantity would exceed
    /// `u32::MAX` or the total would leave the supported range.
    pub fn add(&mut self, item: CartItem, delta: u32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let Some(index) = self.position(&item.id) else {
            self.total_with(&item.id, &item.price, delta)?;
            self.lines.push(CartLine {
                item,
                quantity: delta,
            });
            return Ok(());
        };

        let line = &self.lines[index];
        let quantity = line.quantity.checked_add(delta).ok_or(StorefrontError::InvalidQuantity {
            quantity: i64::from(line.quantity) + i64::from(delta),
        })?;
        self.total_with(&item.id, &line.item.price, quantity)?;
        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Removes the line for `id`, if any.
    pub fn remove(&mut self, id: &str) -> Option<CartLine> {
        let index = self.position(id)?;
        Some(self.lines.remove(index))
    }

    /// Sets the quantity of an existing line. Non-positive values remove it.
    ///
    /// Returns whether a line changed. Quantities above `u32::MAX` are
    /// rejected, as are quantities that would push the total out of range.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) -> Result<bool> {
        if quantity <= 0 {
            return Ok(self.remove(id).is_some());
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| StorefrontError::InvalidQuantity { quantity })?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        if self.lines[index].quantity == quantity {
            return Ok(false);
        }
        self.total_with(id, &self.lines[index].item.price, quantity)?;
        self.lines[index].quantity = quantity;
        Ok(true)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of subtotals.
    ///
    /// Mutations keep the total within [`MAX_TOTAL_AMOUNT`], so the bound is
    /// only reported for carts built by hand from out-of-range lines.
    pub fn total_amount(&self) -> Decimal {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |total, line| total.checked_add(line.subtotal()?))
            .filter(|total| *total <= MAX_TOTAL_AMOUNT)
            .unwrap_or(MAX_TOTAL_AMOUNT)
    }

    pub fn aggregate(&self, unit: &str) -> CartAggregate {
        CartAggregate {
            item_count: self.item_count(),
            total: format_total(self.total_amount(), unit),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id() == id)
    }

    /// Total the cart would have with the line `id` at `quantity` units of
    /// `price`.
    fn total_with(&self, id: &str, price: &Price, quantity: u32) -> Result<Decimal> {
        let replaced = price.amount().checked_mul(Decimal::from(quantity));
        self.lines
            .iter()
            .filter(|line| line.id() != id)
            .map(CartLine::subtotal)
            .chain(std::iter::once(replaced))
            .try_fold(Decimal::ZERO, |total, subtotal| total.checked_add(subtotal?))
            .filter(|total| *total <= MAX_TOTAL_AMOUNT)
            .ok_or(StorefrontError::TotalOverflow)
    }
}

/// Current layout version of the persisted cart blob.
pub const PERSISTED_CART_VERSION: u32 = 0;

/// Serialized cart blob as it sits in local storage.
///
/// `item_count` and `total` are written for readers of the raw blob but are
/// never read back as truth; see [`PersistedCart::into_cart`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedCart {
    pub state: PersistedCartState,
    #[serde(default)]
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCartState {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub item_count: Option<u64>,
    #[serde(default)]
    pub total: Option<String>,
}

/// A cart rebuilt from its persisted blob.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredCart {
    pub cart: Cart,
    pub is_open: bool,
    /// The stored `itemCount` or `total` disagreed with the lines.
    pub drifted: bool,
    /// Lines that were left out: wrong unit or out of range.
    pub discarded: Vec<CartLine>,
}

impl PersistedCart {
    pub fn new(cart: &Cart, is_open: bool, unit: &str) -> Self {
        let aggregate = cart.aggregate(unit);
        Self {
            state: PersistedCartState {
                items: cart.lines().to_vec(),
                is_open,
                item_count: Some(aggregate.item_count),
                total: Some(aggregate.total),
            },
            version: PERSISTED_CART_VERSION,
        }
    }

    /// Rebuilds the cart from the raw lines only. Lines priced in another
    /// unit than `unit` are discarded rather than relabelled.
    pub fn into_cart(self, unit: &str) -> RestoredCart {
        let (cart, discarded) = Cart::from_lines(self.state.items, unit);
        let aggregate = cart.aggregate(unit);
        let count_drift = self
            .state
            .item_count
            .is_some_and(|count| count != aggregate.item_count);
        let total_drift = self
            .state
            .total
            .as_ref()
            .is_some_and(|total| *total != aggregate.total);
        RestoredCart {
            cart,
            is_open: self.state.is_open,
            drifted: count_drift || total_drift,
            discarded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::MAX_PRICE_AMOUNT;
    use rust_decimal_macros::dec;

    fn item(id: &str, price: &str) -> CartItem {
        CartItem {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Price::parse(price).unwrap(),
            image: format!("/img/{id}.png"),
            category: "Digital Art".to_string(),
            token_id: None,
            is_private: None,
        }
    }

    #[test]
    fn test_distinct_ids_make_distinct_lines() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), 1).unwrap();
        cart.add(item("b", "1 ETH"), 3).unwrap();
        cart.add(item("c", "1 ETH"), 2).unwrap();

        assert_eq!(cart.len(), 3);
        assert_eq!(cart.item_count(), 6);
    }

    #[test]
    fn test_same_id_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), 1).unwrap();
        cart.add(item("a", "1 ETH"), 1).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("a").unwrap().quantity, 2);
    }

    #[test]
    fn test_zero_delta_is_noop() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), 0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_is_absolute() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), 4).unwrap();

        assert!(cart.set_quantity("a", 2).unwrap());
        assert_eq!(cart.get("a").unwrap().quantity, 2);
        assert!(!cart.set_quantity("a", 2).unwrap());
        assert!(!cart.set_quantity("missing", 2).unwrap());
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), 1).unwrap();
        cart.add(item("b", "1 ETH"), 1).unwrap();

        assert!(cart.set_quantity("a", 0).unwrap());
        assert!(cart.set_quantity("b", -3).unwrap());
        assert!(!cart.set_quantity("b", -3).unwrap());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_amount_and_aggregate() {
        let mut cart = Cart::new();
        cart.add(item("a", "1.000 ETH"), 2).unwrap();
        cart.add(item("b", "0.500 ETH"), 1).unwrap();

        assert_eq!(cart.total_amount(), dec!(2.5));
        assert_eq!(
            cart.aggregate("ETH"),
            CartAggregate {
                item_count: 3,
                total: "2.500 ETH".to_string()
            }
        );
    }

    #[test]
    fn test_empty_cart_aggregate() {
        assert_eq!(Cart::new().aggregate("ETH").total, "0.000 ETH");
        assert_eq!(Cart::new().aggregate("MATIC").total, "0.000 MATIC");
    }

    #[test]
    fn test_from_lines_normalizes() {
        let lines = vec![
            CartLine {
                item: item("a", "1 ETH"),
                quantity: 1,
            },
            CartLine {
                item: item("b", "1 ETH"),
                quantity: 0,
            },
            CartLine {
                item: item("a", "1 ETH"),
                quantity: 2,
            },
        ];
        let (cart, rejected) = Cart::from_lines(lines, "ETH");

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("a").unwrap().quantity, 3);
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_persisted_layout_uses_storefront_field_names() {
        let mut cart = Cart::new();
        let mut nft = item("nft", "2.5 ETH");
        nft.token_id = Some("NFT001".to_string());
        cart.add(nft, 1).unwrap();

        let json = serde_json::to_value(PersistedCart::new(&cart, true, "ETH")).unwrap();
        assert_eq!(json["version"], 0);
        assert_eq!(json["state"]["isOpen"], true);
        assert_eq!(json["state"]["itemCount"], 1);
        assert_eq!(json["state"]["total"], "2.500 ETH");
        assert_eq!(json["state"]["items"][0]["tokenId"], "NFT001");
        assert_eq!(json["state"]["items"][0]["price"], "2.5 ETH");
        assert_eq!(json["state"]["items"][0]["quantity"], 1);
        assert!(json["state"]["items"][0].get("isPrivate").is_none());
    }

    #[test]
    fn test_into_cart_recomputes_derived_fields() {
        let raw = r#"{
            "state": {
                "items": [
                    {"id": "a", "name": "A", "price": "1.000 ETH", "image": "", "category": "Art", "quantity": 2}
                ],
                "isOpen": false,
                "itemCount": 99,
                "total": "123.000 ETH"
            },
            "version": 0
        }"#;
        let persisted: PersistedCart = serde_json::from_str(raw).unwrap();
        let restored = persisted.into_cart("ETH");

        assert!(!restored.is_open);
        assert!(restored.drifted);
        assert!(restored.discarded.is_empty());
        assert_eq!(restored.cart.aggregate("ETH").item_count, 2);
        assert_eq!(restored.cart.aggregate("ETH").total, "2.000 ETH");
    }

    #[test]
    fn test_into_cart_discards_lines_in_other_units() {
        let raw = r#"{
            "state": {
                "items": [
                    {"id": "a", "name": "A", "price": "1 ETH", "image": "", "category": "Art", "quantity": 1},
                    {"id": "b", "name": "B", "price": "1000 USDC", "image": "", "category": "Art", "quantity": 1}
                ],
                "isOpen": true
            },
            "version": 0
        }"#;
        let persisted: PersistedCart = serde_json::from_str(raw).unwrap();
        let restored = persisted.into_cart("ETH");

        assert_eq!(restored.cart.len(), 1);
        assert_eq!(restored.cart.aggregate("ETH").total, "1.000 ETH");
        assert_eq!(restored.discarded.len(), 1);
        assert_eq!(restored.discarded[0].id(), "b");

        let persisted: PersistedCart = serde_json::from_str(raw).unwrap();
        let restored = persisted.into_cart("MATIC");
        assert!(restored.cart.is_empty());
        assert_eq!(restored.discarded.len(), 2);
    }

    fn priced(id: &str, amount: Decimal) -> CartItem {
        CartItem {
            price: Price::new(amount, "ETH").unwrap(),
            ..item(id, "1 ETH")
        }
    }

    #[test]
    fn test_quantity_overflow_is_rejected() {
        let mut cart = Cart::new();
        cart.add(item("a", "1 ETH"), u32::MAX - 1).unwrap();

        assert!(matches!(
            cart.add(item("a", "1 ETH"), 2),
            Err(StorefrontError::InvalidQuantity { quantity }) if quantity == i64::from(u32::MAX) + 1
        ));
        assert_eq!(cart.get("a").unwrap().quantity, u32::MAX - 1);

        let too_many = i64::from(u32::MAX) + 1;
        assert!(matches!(
            cart.set_quantity("a", too_many),
            Err(StorefrontError::InvalidQuantity { quantity }) if quantity == too_many
        ));
        assert!(matches!(
            cart.set_quantity("a", 10_000_000_000),
            Err(StorefrontError::InvalidQuantity { .. })
        ));
        assert_eq!(cart.get("a").unwrap().quantity, u32::MAX - 1);

        assert!(cart.set_quantity("a", i64::from(u32::MAX)).unwrap());
        assert_eq!(cart.item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_total_stays_in_range() {
        let mut cart = Cart::new();
        let mut refused = None;
        for n in 0..300 {
            let id = format!("max-{n}");
            if let Err(e) = cart.add(priced(&id, MAX_PRICE_AMOUNT), u32::MAX) {
                refused = Some((n, e));
                break;
            }
        }

        let (accepted, error) = refused.expect("the total bound should be reached");
        assert!(matches!(error, StorefrontError::TotalOverflow));
        assert_eq!(accepted, 232);
        assert_eq!(cart.len(), accepted);
        assert!(cart.total_amount() <= MAX_TOTAL_AMOUNT);
        assert!(cart.aggregate("ETH").total.ends_with(" ETH"));

        assert!(matches!(
            cart.add(priced("big", MAX_PRICE_AMOUNT), 4_000_000_000),
            Err(StorefrontError::TotalOverflow)
        ));
        assert!(cart.get("big").is_none());
        cart.add(priced("small", dec!(1)), 1).unwrap();
        assert_eq!(cart.len(), accepted + 1);
    }

    #[test]
    fn test_from_lines_hands_back_out_of_range_lines() {
        let lines = (0..300).map(|n| CartLine {
            item: priced(&format!("max-{n}"), MAX_PRICE_AMOUNT),
            quantity: u32::MAX,
        });
        let (cart, rejected) = Cart::from_lines(lines, "ETH");

        assert_eq!(cart.len() + rejected.len(), 300);
        assert!(!rejected.is_empty());
        assert!(cart.total_amount() <= MAX_TOTAL_AMOUNT);
    }
}
