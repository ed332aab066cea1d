//! Revenue Split
//!
//! Attributes the goods and delivery revenue of a paid checkout to the creators who sold it.
//! Creator ownership is taken from the sold items themselves, which are snapshotted at capture
//! time, so reassigning a product later never changes a historical payout.

use std::{collections::BTreeMap, fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    delivery::DIGITAL,
    money::{self, MoneyCalcError},
};

/// Errors raised while splitting revenue.
#[derive(Debug, Error, PartialEq)]
pub enum RevenueError {
    /// A sold item is priced in a different currency to the session.
    #[error("item {product_id} is priced in {found}, session settles in {expected}")]
    CurrencyMismatch {
        /// Product id
        product_id: String,

        /// Session currency code
        expected: &'static str,

        /// Item currency code
        found: &'static str,
    },

    /// Unrecognised shipping policy name.
    #[error("unknown shipping policy {0}, expected even or proportional")]
    UnknownPolicy(String),

    /// Wrapped money calculation error.
    #[error(transparent)]
    Money(#[from] MoneyCalcError),
}

/// How an order-level shipping amount is shared between creators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingPolicy {
    /// Equal shares, leftover minor units to the first creators by id.
    #[default]
    Even,

    /// In proportion to each creator's goods revenue.
    Proportional,
}

impl fmt::Display for ShippingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Even => "even",
            Self::Proportional => "proportional",
        })
    }
}

impl FromStr for ShippingPolicy {
    type Err = RevenueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "even" => Ok(Self::Even),
            "proportional" => Ok(Self::Proportional),
            other => Err(RevenueError::UnknownPolicy(other.to_string())),
        }
    }
}

/// A line of a paid checkout, as snapshotted at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct SoldItem {
    /// Product id
    pub product_id: String,

    /// Product name
    pub name: String,

    /// Creator who owned the product at the time of sale; `None` if the product is gone
    pub creator_id: Option<String>,

    /// Unit price paid
    pub unit_price: Money<'static, Currency>,

    /// Units sold
    pub quantity: u32,

    /// Delivery fee per unit
    pub delivery_fee: Money<'static, Currency>,

    /// Delivery type
    pub delivery_type: String,

    /// Download links to grant
    pub digital_links: Vec<String>,
}

/// Revenue owed to one creator.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatorRevenue {
    /// `Σ unit_price * quantity`
    pub product_revenue: Money<'static, Currency>,

    /// Delivery fees of the creator's items plus their share of shared shipping
    pub shipping_revenue: Money<'static, Currency>,

    /// Items attributed to the creator
    pub items: Vec<SoldItem>,
}

impl CreatorRevenue {
    /// Empty revenue in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            product_revenue: money::zero(currency),
            shipping_revenue: money::zero(currency),
            items: Vec::new(),
        }
    }

    /// `product_revenue + shipping_revenue`.
    ///
    /// # Errors
    ///
    /// Returns an error on currency mismatch.
    pub fn total(&self) -> Result<Money<'static, Currency>, MoneyCalcError> {
        Ok(self.product_revenue.add(self.shipping_revenue)?)
    }

    fn record(&mut self, item: &SoldItem) -> Result<(), MoneyCalcError> {
        self.product_revenue = self
            .product_revenue
            .add(money::times(item.unit_price, item.quantity)?)?;
        self.shipping_revenue = self
            .shipping_revenue
            .add(money::times(item.delivery_fee, item.quantity)?)?;
        self.items.push(item.clone());

        Ok(())
    }
}

/// Download links owed to a buyer for one digital product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalGrant {
    /// Buyer
    pub buyer_id: String,

    /// Links to grant, without duplicates
    pub links: Vec<String>,

    /// Whether the links have been delivered
    pub granted: bool,
}

/// Result of marking a digital grant delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    /// The grant was pending and is now delivered.
    Granted,

    /// The grant had already been delivered; nothing changed.
    AlreadyGranted,
}

impl DigitalGrant {
    /// Mark the links as delivered. Repeated calls change nothing.
    pub fn mark_granted(&mut self) -> GrantOutcome {
        if self.granted {
            return GrantOutcome::AlreadyGranted;
        }

        self.granted = true;

        GrantOutcome::Granted
    }
}

/// Per-creator revenue of one checkout session.
#[derive(Debug, Clone, PartialEq)]
pub struct RevenueSplit {
    /// Settlement currency
    pub currency: &'static Currency,

    /// Revenue by creator id
    pub creators: BTreeMap<String, CreatorRevenue>,

    /// Revenue of items whose product could not be resolved, kept for manual reconciliation
    pub unattributed: Option<CreatorRevenue>,

    /// Digital grants by product id
    pub digital: BTreeMap<String, DigitalGrant>,
}

impl RevenueSplit {
    /// Sum of every bucket.
    ///
    /// # Errors
    ///
    /// Returns an error on overflow or currency mismatch.
    pub fn total(&self) -> Result<Money<'static, Currency>, MoneyCalcError> {
        let totals = self
            .creators
            .values()
            .chain(self.unattributed.as_ref())
            .map(CreatorRevenue::total)
            .collect::<Result<Vec<_>, _>>()?;

        money::total(totals, self.currency)
    }

    /// True when the split accounts for `expected` to within one minor unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the split total cannot be computed.
    pub fn reconciles_with(
        &self,
        expected: Money<'static, Currency>,
    ) -> Result<bool, MoneyCalcError> {
        if expected.currency() != self.currency {
            return Ok(false);
        }

        let difference = self.total()?.to_minor_units() - expected.to_minor_units();

        Ok(difference.abs() <= 1)
    }
}

/// Split the revenue of `items` between their creators.
///
/// Each item's own delivery fees go to its creator. `shared_shipping`, an order-level amount not
/// tied to any line, is divided between the creators according to `policy`.
///
/// # Errors
///
/// Returns a [`RevenueError`] if an item is in another currency or the arithmetic overflows.
pub fn split(
    items: &[SoldItem],
    buyer_id: &str,
    shared_shipping: Option<Money<'static, Currency>>,
    policy: ShippingPolicy,
    currency: &'static Currency,
) -> Result<RevenueSplit, RevenueError> {
    let mut creators: BTreeMap<String, CreatorRevenue> = BTreeMap::new();
    let mut unattributed: Option<CreatorRevenue> = None;
    let mut digital: BTreeMap<String, DigitalGrant> = BTreeMap::new();

    for item in items {
        for amount in [item.unit_price, item.delivery_fee] {
            if amount.currency() != currency {
                return Err(RevenueError::CurrencyMismatch {
                    product_id: item.product_id.clone(),
                    expected: currency.iso_alpha_code,
                    found: amount.currency().iso_alpha_code,
                });
            }
        }

        let bucket = match &item.creator_id {
            Some(creator_id) => creators
                .entry(creator_id.clone())
                .or_insert_with(|| CreatorRevenue::new(currency)),
            None => unattributed.get_or_insert_with(|| CreatorRevenue::new(currency)),
        };

        bucket.record(item)?;

        if item.delivery_type == DIGITAL {
            let grant = digital
                .entry(item.product_id.clone())
                .or_insert_with(|| DigitalGrant {
                    buyer_id: buyer_id.to_string(),
                    links: Vec::new(),
                    granted: false,
                });

            for link in &item.digital_links {
                if !grant.links.contains(link) {
                    grant.links.push(link.clone());
                }
            }
        }
    }

    if let Some(shared) = shared_shipping.filter(|amount| amount.to_minor_units() != 0) {
        if shared.currency() != currency {
            return Err(RevenueError::CurrencyMismatch {
                product_id: "shared shipping".to_string(),
                expected: currency.iso_alpha_code,
                found: shared.currency().iso_alpha_code,
            });
        }

        allocate_shared_shipping(shared, policy, &mut creators, &mut unattributed, currency)?;
    }

    Ok(RevenueSplit {
        currency,
        creators,
        unattributed,
        digital,
    })
}

fn allocate_shared_shipping(
    shared: Money<'static, Currency>,
    policy: ShippingPolicy,
    creators: &mut BTreeMap<String, CreatorRevenue>,
    unattributed: &mut Option<CreatorRevenue>,
    currency: &'static Currency,
) -> Result<(), MoneyCalcError> {
    // With nobody to pay, the amount is parked rather than lost.
    if creators.is_empty() && unattributed.is_none() {
        let bucket = unattributed.get_or_insert_with(|| CreatorRevenue::new(currency));
        bucket.shipping_revenue = bucket.shipping_revenue.add(shared)?;

        return Ok(());
    }

    let mut buckets: Vec<&mut CreatorRevenue> =
        creators.values_mut().chain(unattributed.as_mut()).collect();

    let shares = match policy {
        ShippingPolicy::Even => money::allocate_evenly(shared, buckets.len())?,
        ShippingPolicy::Proportional => {
            let weights: Vec<i64> = buckets
                .iter()
                .map(|bucket| bucket.product_revenue.to_minor_units())
                .collect();

            money::allocate_proportionally(shared, &weights)?
        }
    };

    for (bucket, share) in buckets.iter_mut().zip(shares) {
        bucket.shipping_revenue = bucket.shipping_revenue.add(share)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{SGD, USD};
    use testresult::TestResult;

    use super::*;

    fn item(product_id: &str, creator_id: Option<&str>, price: i64, quantity: u32) -> SoldItem {
        SoldItem {
            product_id: product_id.to_string(),
            name: product_id.to_string(),
            creator_id: creator_id.map(str::to_string),
            unit_price: Money::from_minor(price, SGD),
            quantity,
            delivery_fee: Money::from_minor(0, SGD),
            delivery_type: "standard".to_string(),
            digital_links: Vec::new(),
        }
    }

    fn revenue_of<'a>(split: &'a RevenueSplit, creator: &str) -> Option<&'a CreatorRevenue> {
        split.creators.get(creator)
    }

    #[test]
    fn attributes_goods_and_line_delivery_to_creator() -> TestResult {
        let mut lamp = item("lamp", Some("alice"), 10_000, 2);
        lamp.delivery_fee = Money::from_minor(500, SGD);

        let split = split(
            &[lamp, item("mug", Some("bob"), 1_500, 1)],
            "buyer",
            None,
            ShippingPolicy::Even,
            SGD,
        )?;

        let alice = revenue_of(&split, "alice").ok_or("alice missing")?;
        assert_eq!(alice.product_revenue, Money::from_minor(20_000, SGD));
        assert_eq!(alice.shipping_revenue, Money::from_minor(1_000, SGD));

        let bob = revenue_of(&split, "bob").ok_or("bob missing")?;
        assert_eq!(bob.product_revenue, Money::from_minor(1_500, SGD));
        assert_eq!(bob.items.len(), 1);

        assert_eq!(split.total()?, Money::from_minor(22_500, SGD));

        Ok(())
    }

    #[test]
    fn even_shared_shipping_gives_leftover_to_first_creator() -> TestResult {
        let split = split(
            &[
                item("a", Some("alice"), 1_000, 1),
                item("b", Some("bob"), 1_000, 1),
                item("c", Some("carol"), 1_000, 1),
            ],
            "buyer",
            Some(Money::from_minor(100, SGD)),
            ShippingPolicy::Even,
            SGD,
        )?;

        let shipping: Vec<i64> = split
            .creators
            .values()
            .map(|revenue| revenue.shipping_revenue.to_minor_units())
            .collect();

        assert_eq!(shipping, vec![34, 33, 33]);
        assert!(split.reconciles_with(Money::from_minor(3_100, SGD))?);

        Ok(())
    }

    #[test]
    fn proportional_shared_shipping_follows_goods_revenue() -> TestResult {
        let split = split(
            &[
                item("a", Some("alice"), 3_000, 1),
                item("b", Some("bob"), 1_000, 1),
            ],
            "buyer",
            Some(Money::from_minor(1_000, SGD)),
            ShippingPolicy::Proportional,
            SGD,
        )?;

        assert_eq!(
            revenue_of(&split, "alice").map(|revenue| revenue.shipping_revenue),
            Some(Money::from_minor(750, SGD))
        );
        assert_eq!(
            revenue_of(&split, "bob").map(|revenue| revenue.shipping_revenue),
            Some(Money::from_minor(250, SGD))
        );

        Ok(())
    }

    #[test]
    fn unknown_product_revenue_is_kept_unattributed() -> TestResult {
        let split = split(
            &[item("gone", None, 2_500, 1), item("a", Some("alice"), 1_000, 1)],
            "buyer",
            None,
            ShippingPolicy::Even,
            SGD,
        )?;

        assert_eq!(
            split
                .unattributed
                .as_ref()
                .map(|revenue| revenue.product_revenue),
            Some(Money::from_minor(2_500, SGD))
        );
        assert_eq!(split.total()?, Money::from_minor(3_500, SGD));

        Ok(())
    }

    #[test]
    fn digital_items_record_deduplicated_grants() -> TestResult {
        let mut ebook = item("ebook", Some("alice"), 900, 1);
        ebook.delivery_type = DIGITAL.to_string();
        ebook.digital_links = vec!["https://files/ebook.pdf".to_string()];

        let split = split(
            &[ebook.clone(), ebook],
            "buyer-7",
            None,
            ShippingPolicy::Even,
            SGD,
        )?;

        let grant = split.digital.get("ebook").ok_or("grant missing")?;
        assert_eq!(grant.buyer_id, "buyer-7");
        assert_eq!(grant.links, vec!["https://files/ebook.pdf".to_string()]);
        assert!(!grant.granted);

        Ok(())
    }

    #[test]
    fn marking_a_grant_twice_is_a_no_op() {
        let mut grant = DigitalGrant {
            buyer_id: "buyer-7".to_string(),
            links: vec!["https://files/ebook.pdf".to_string()],
            granted: false,
        };

        assert_eq!(grant.mark_granted(), GrantOutcome::Granted);
        assert!(grant.granted);
        assert_eq!(grant.mark_granted(), GrantOutcome::AlreadyGranted);
        assert!(grant.granted);
    }

    #[test]
    fn foreign_currency_item_is_rejected() {
        let mut import = item("import", Some("alice"), 1_000, 1);
        import.unit_price = Money::from_minor(1_000, USD);

        let result = split(&[import], "buyer", None, ShippingPolicy::Even, SGD);

        assert!(matches!(
            result,
            Err(RevenueError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn shipping_policy_parses_names() -> TestResult {
        assert_eq!("proportional".parse::<ShippingPolicy>()?, ShippingPolicy::Proportional);
        assert_eq!(ShippingPolicy::default().to_string(), "even");
        assert!("random".parse::<ShippingPolicy>().is_err());

        Ok(())
    }
}
