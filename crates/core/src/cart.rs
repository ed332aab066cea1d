//! Cart
//!
//! The server-side cart. Lines are identified by product and normalized variant selection, so
//! adding the same selection twice merges quantities instead of creating a second line.

use thiserror::Error;

use crate::{
    custom_print::CustomPrintRequest, delivery::is_indivisible, products::ProductRef,
    variants::VariantSelector,
};

/// Errors raised by cart mutations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// No line matches the product and variant.
    #[error("cart has no line for {product} ({variant})")]
    LineNotFound {
        /// Product id
        product: String,

        /// Variant selection
        variant: String,
    },

    /// Lines always hold at least one unit.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Not enough stock for the requested quantity.
    #[error("only {available} of {product} in stock, {requested} requested")]
    OutOfStock {
        /// Product id
        product: String,

        /// Quantity the line would hold
        requested: u32,

        /// Units available
        available: u32,
    },
}

/// One line of a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Product, possibly a custom-print reference
    pub product: ProductRef,

    /// Variant selection
    pub variant: VariantSelector,

    /// Units, always at least 1
    pub quantity: u32,

    /// Chosen delivery type
    pub delivery_type: String,

    /// Free-text note for the creator
    pub order_note: Option<String>,
}

impl CartLine {
    /// Create a line.
    pub fn new(
        product: ProductRef,
        variant: VariantSelector,
        quantity: u32,
        delivery_type: impl Into<String>,
    ) -> Self {
        Self {
            product,
            variant,
            quantity,
            delivery_type: delivery_type.into(),
            order_note: None,
        }
    }

    /// True when this line is for `product` with `variant`.
    pub fn matches(&self, product: &ProductRef, variant: &VariantSelector) -> bool {
        self.product == *product && self.variant == *variant
    }

    /// Quantity is pinned to one for the chosen delivery type.
    pub fn is_quantity_locked(&self) -> bool {
        is_indivisible(&self.delivery_type)
    }
}

/// Quantity adjustment requested by the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// One more unit.
    Increment,

    /// One fewer unit; removes the line below one.
    Decrement,

    /// An explicit quantity; zero removes the line.
    Set(u32),
}

/// Result of a quantity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The line now holds this many units.
    Updated(u32),

    /// The line was removed.
    Removed,

    /// The line's delivery type pins its quantity; nothing changed.
    Locked,
}

/// A buyer's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    /// Lines in insertion order
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Create a cart from existing lines.
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// True when the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for `product` with `variant`.
    pub fn line(&self, product: &ProductRef, variant: &VariantSelector) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(product, variant))
    }

    /// Add a line, merging it into an existing line for the same selection.
    ///
    /// Returns the quantity the line holds afterwards. `available` is the stock for the
    /// selection, `None` when untracked.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] for an empty line and [`CartError::OutOfStock`] when
    /// the merged quantity exceeds `available`.
    pub fn add(&mut self, mut line: CartLine, available: Option<u32>) -> Result<u32, CartError> {
        if line.quantity == 0 {
            return Err(CartError::ZeroQuantity);
        }

        if line.is_quantity_locked() {
            line.quantity = 1;
        }

        let position = self
            .lines
            .iter()
            .position(|existing| existing.matches(&line.product, &line.variant));

        let Some(existing) = position.and_then(|index| self.lines.get_mut(index)) else {
            check_stock(&line.product, line.quantity, available)?;

            let quantity = line.quantity;
            self.lines.push(line);

            return Ok(quantity);
        };

        let quantity = if existing.is_quantity_locked() {
            1
        } else {
            existing.quantity.saturating_add(line.quantity)
        };

        check_stock(&existing.product, quantity, available)?;

        existing.quantity = quantity;

        if line.order_note.is_some() {
            existing.order_note = line.order_note;
        }

        Ok(quantity)
    }

    /// Change the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line matches and [`CartError::OutOfStock`] when
    /// the new quantity exceeds `available`.
    pub fn change_quantity(
        &mut self,
        product: &ProductRef,
        variant: &VariantSelector,
        change: QuantityChange,
        available: Option<u32>,
    ) -> Result<QuantityOutcome, CartError> {
        let line = self.line_mut(product, variant)?;

        if line.is_quantity_locked() {
            return Ok(QuantityOutcome::Locked);
        }

        let quantity = match change {
            QuantityChange::Increment => line.quantity.saturating_add(1),
            QuantityChange::Decrement => line.quantity.saturating_sub(1),
            QuantityChange::Set(quantity) => quantity,
        };

        if quantity == 0 {
            self.remove(product, variant)?;

            return Ok(QuantityOutcome::Removed);
        }

        // Shrinking is always allowed, even when stock has since dropped below the line.
        if quantity > line.quantity {
            check_stock(&line.product, quantity, available)?;
        }

        line.quantity = quantity;

        Ok(QuantityOutcome::Updated(quantity))
    }

    /// Choose a delivery type for a line.
    ///
    /// Indivisible delivery types reset the quantity to one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line matches.
    pub fn set_delivery_type(
        &mut self,
        product: &ProductRef,
        variant: &VariantSelector,
        delivery_type: impl Into<String>,
    ) -> Result<(), CartError> {
        let line = self.line_mut(product, variant)?;

        line.delivery_type = delivery_type.into();

        if line.is_quantity_locked() {
            line.quantity = 1;
        }

        Ok(())
    }

    /// Set or clear a line's order note.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line matches.
    pub fn set_order_note(
        &mut self,
        product: &ProductRef,
        variant: &VariantSelector,
        note: Option<String>,
    ) -> Result<(), CartError> {
        let line = self.line_mut(product, variant)?;

        line.order_note = note.filter(|note| !note.trim().is_empty());

        Ok(())
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line matches.
    pub fn remove(
        &mut self,
        product: &ProductRef,
        variant: &VariantSelector,
    ) -> Result<CartLine, CartError> {
        let position = self
            .lines
            .iter()
            .position(|line| line.matches(product, variant))
            .ok_or_else(|| not_found(product, variant))?;

        Ok(self.lines.remove(position))
    }

    /// Ids of the custom-print requests referenced by the cart.
    pub fn custom_print_requests(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter_map(|line| line.product.custom_print_request())
    }

    /// Move lines for `request` off delivery types the request no longer offers.
    ///
    /// Returns the number of lines changed.
    pub fn apply_delivery_fallback(&mut self, request: &CustomPrintRequest) -> usize {
        let mut changed = 0;

        for line in &mut self.lines {
            if line.product.custom_print_request() != Some(request.id.as_str()) {
                continue;
            }

            if let Some(fallback) = request.reconcile_delivery_type(&line.delivery_type) {
                line.delivery_type = fallback;

                if line.is_quantity_locked() {
                    line.quantity = 1;
                }

                changed += 1;
            }
        }

        changed
    }

    fn line_mut(
        &mut self,
        product: &ProductRef,
        variant: &VariantSelector,
    ) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.matches(product, variant))
            .ok_or_else(|| not_found(product, variant))
    }
}

fn not_found(product: &ProductRef, variant: &VariantSelector) -> CartError {
    CartError::LineNotFound {
        product: product.to_string(),
        variant: variant.to_string(),
    }
}

fn check_stock(
    product: &ProductRef,
    requested: u32,
    available: Option<u32>,
) -> Result<(), CartError> {
    match available {
        Some(available) if requested > available => Err(CartError::OutOfStock {
            product: product.to_string(),
            requested,
            available,
        }),
        _ => Ok(()),
    }
}
