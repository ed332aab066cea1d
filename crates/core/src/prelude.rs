//! Gantry prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    breakdown::{
        Breakdown, BreakdownError, BreakdownLine, PricingContext, SkipReason, SkippedLine,
        build_breakdown,
    },
    cart::{Cart, CartError, CartLine, QuantityChange, QuantityOutcome},
    catalog::{
        CatalogSnapshot, CatalogSource, LookupError, lookup, resolve_custom_print, resolve_product,
    },
    custom_print::{
        Actor, CustomPrintRequest, DeliveryQuote, ModelFile, PrintConfiguration, PrintError,
        PrintStatus, PrintTransition, ensure_checkout_eligible, reconcile_delivery_type,
    },
    delivery::{
        DIGITAL, DeliveryError, DeliveryOption, DeliveryPricing, MeasureRange, PRINT_DELIVERY,
        PricingTier, delivery_fee,
    },
    discounts::{
        AppliedDiscount, DiscountError, EffectivePrice, Event, ProductDiscount, effective_price,
    },
    money::MoneyCalcError,
    products::{
        CUSTOM_PRINT_PREFIX, Dimensions, Product, ProductRef, ProductSnapshot, Variant,
        VariantOption, VariantType,
    },
    revenue::{
        CreatorRevenue, DigitalGrant, GrantOutcome, RevenueError, RevenueSplit, ShippingPolicy,
        SoldItem, split,
    },
    variants::{VariantKey, VariantSelector},
};
