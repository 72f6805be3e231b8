//! Session-scoped shopping cart
//!
//! Lives only in client memory; checkout turns it into an order. Every
//! operation is total - quantities are clamped to the product's stock
//! instead of failing, and totals are recomputed on every read.

use rust_decimal::Decimal;
use shared::models::{CommandItemRequest, CommandRequest, Product};

/// One selected product with its quantity
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

/// In-memory cart, ordered by insertion
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lines, in insertion order
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Quantity currently in the cart for a product
    pub fn quantity_of(&self, product_id: u64) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product.product_id == product_id)
            .map_or(0, |line| line.quantity)
    }

    /// Add a product, or increase its quantity if already present
    ///
    /// The resulting quantity is capped at the product's stock. A product
    /// with no stock never produces a line.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let capped = |q: u32| q.min(product.stock);

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.product_id == product.product_id)
        {
            line.quantity = capped(line.quantity.saturating_add(quantity));
            return;
        }

        let quantity = capped(quantity);
        if quantity > 0 {
            self.lines.push(CartLine {
                product: product.clone(),
                quantity,
            });
        }
    }

    /// Remove a line entirely
    pub fn remove(&mut self, product_id: u64) {
        self.lines.retain(|line| line.product.product_id != product_id);
    }

    /// Set the quantity for a line, clamped to [1, stock]
    ///
    /// Zero removes the line. Setting a quantity for a product that is not
    /// in the cart does nothing.
    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.product_id == product_id)
        {
            line.quantity = quantity.min(line.product.stock).max(1);
        }
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of all quantities
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of price x quantity over all lines
    pub fn total_price(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.product.price * Decimal::from(line.quantity))
            .sum()
    }

    /// Build the checkout payload from the current lines
    pub fn to_command_request(&self) -> CommandRequest {
        CommandRequest {
            items: self
                .lines
                .iter()
                .map(|line| CommandItemRequest {
                    product_id: line.product.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(id: u64, price: &str, stock: u32) -> Product {
        Product {
            product_id: id,
            name: format!("product-{id}"),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            stock,
        }
    }

    #[test]
    fn add_accumulates_and_clamps_to_stock() {
        let p = product(1, "9.99", 3);
        let mut cart = Cart::new();

        cart.add(&p, 1);
        cart.add(&p, 1);
        assert_eq!(cart.quantity_of(1), 2);
        assert_eq!(cart.total_price(), Decimal::from_str("19.98").unwrap());

        cart.add(&p, 1);
        assert_eq!(cart.quantity_of(1), 3);

        // Fourth add stays clamped at the stock ceiling
        cart.add(&p, 1);
        assert_eq!(cart.quantity_of(1), 3);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn out_of_stock_product_never_enters_the_cart() {
        let p = product(7, "1.00", 0);
        let mut cart = Cart::new();
        cart.add(&p, 2);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn set_quantity_clamps_and_zero_removes() {
        let p = product(1, "5.00", 4);
        let mut cart = Cart::new();
        cart.add(&p, 2);

        cart.set_quantity(1, 10);
        assert_eq!(cart.quantity_of(1), 4);

        cart.set_quantity(1, 1);
        assert_eq!(cart.quantity_of(1), 1);

        cart.set_quantity(1, 0);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
    }

    #[test]
    fn removing_the_only_line_restores_the_empty_state() {
        let p = product(3, "2.50", 5);
        let mut cart = Cart::new();
        cart.add(&p, 2);

        cart.remove(3);
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Decimal::ZERO);
        assert!(cart.to_command_request().items.is_empty());
    }

    #[test]
    fn totals_follow_the_lines() {
        let mut cart = Cart::new();
        cart.add(&product(1, "5.00", 10), 2);
        cart.add(&product(2, "10.00", 10), 1);

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Decimal::from_str("20.00").unwrap());
    }

    #[test]
    fn checkout_payload_matches_the_lines() {
        let mut cart = Cart::new();
        cart.add(&product(1, "5.00", 10), 2);
        cart.add(&product(2, "10.00", 10), 1);

        let request = cart.to_command_request();
        assert_eq!(
            request.items,
            vec![
                CommandItemRequest {
                    product_id: 1,
                    quantity: 2
                },
                CommandItemRequest {
                    product_id: 2,
                    quantity: 1
                },
            ]
        );
    }
}
