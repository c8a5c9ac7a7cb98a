//! Plain-text views of command results.

use skywalker::{
    cart::StockAdjustment,
    checkout::CheckoutStep,
    orders::Order,
    pricing::unit_price,
    products::Product,
    summary::{CartSummary, SummaryInputs},
};
use skywalker_app::{
    domain::{
        carts::CartUpdate,
        checkout::{CheckoutView, Confirmation},
    },
    errors::AppError,
};

fn data_error(error: impl std::fmt::Display) -> AppError {
    AppError::Data(error.to_string())
}

pub(crate) fn product_row(product: &Product) -> String {
    let price = product.sale_price.unwrap_or(product.base_price);
    let availability = if product.is_available() { "" } else { "  (sold out)" };

    format!(
        "{:<24} {:<36} {price}{availability}",
        product.slug, product.name
    )
}

pub(crate) fn product(product: &Product) -> Result<String, AppError> {
    let mut out = vec![format!("{} ({})", product.name, product.slug)];

    if product.is_on_sale() {
        out.push(format!("on sale, was {}", product.base_price));
    }

    for variant in &product.variants {
        let price = unit_price(product, variant).map_err(data_error)?;
        let stock = match variant.inventory.orderable() {
            0 => "sold out".to_string(),
            available => format!("{available} left"),
        };

        out.push(format!(
            "  {:<20} {:<16} {price}  {stock}",
            variant.sku,
            variant.describe()
        ));
    }

    Ok(out.join("\n"))
}

pub(crate) fn cart(update: &CartUpdate) -> Result<String, AppError> {
    let mut out = adjustments(&update.adjustments);

    if update.cart.is_empty() {
        out.push("your cart is empty".to_string());

        return Ok(out.join("\n"));
    }

    for line in update.cart.lines() {
        let total = line.total().map_err(data_error)?;

        out.push(format!(
            "{:<20} {} ({}) x{} @ {} = {total}",
            line.sku, line.name, line.variant_label, line.quantity, line.unit_price
        ));
    }

    let summary = update.cart.summary(&SummaryInputs::default())?;
    summary_lines(&summary, &mut out);

    Ok(out.join("\n"))
}

pub(crate) fn checkout(view: &CheckoutView) -> String {
    let session = &view.session;
    let mut out = adjustments(&view.adjustments);

    let steps = CheckoutStep::ALL
        .into_iter()
        .map(|step| {
            let mark = if step == session.step() {
                ">"
            } else if session.is_complete(step) {
                "x"
            } else {
                " "
            };

            format!("[{mark}] {step}")
        })
        .collect::<Vec<_>>();

    out.push(steps.join("  "));

    if let Some(email) = session.email() {
        out.push(format!("email: {email}"));
    }

    if let Some(address) = session.shipping_address() {
        out.push(format!("ship to: {}", address.to_string().replace('\n', ", ")));
    }

    if !view.shipping.is_empty() {
        out.push("shipping methods:".to_string());

        for method in view.shipping.methods() {
            let chosen = view
                .shipping
                .selected()
                .is_some_and(|selected| selected.id == method.id);

            out.push(format!(
                "  {} {:<10} {:<20} {} ({})",
                if chosen { "*" } else { " " },
                method.id,
                method.name,
                method.price,
                method.estimated_days
            ));
        }
    }

    if let Some(card) = session.card() {
        out.push(format!("card: {card}"));
    }

    if let Some(code) = session.discount_code() {
        out.push(format!("code: {code}"));
    }

    summary_lines(&view.summary, &mut out);

    out.join("\n")
}

pub(crate) fn confirmation(confirmation: &Confirmation) -> String {
    let mut out = vec![format!(
        "order {} placed ({})",
        confirmation.order_number, confirmation.status
    )];

    if let Some(email) = &confirmation.email {
        out.push(format!("a receipt is on its way to {email}"));
    }

    summary_lines(&confirmation.summary, &mut out);

    out.join("\n")
}

pub(crate) fn order(order: &Order) -> String {
    let mut out = vec![format!("order {}: {}", order.number, order.status)];

    if let Some(tracking) = &order.tracking_number {
        out.push(format!("tracking: {tracking}"));
    }

    for line in &order.lines {
        out.push(format!(
            "  {} ({}) x{} @ {}",
            line.name, line.variant_label, line.quantity, line.unit_price
        ));
    }

    out.push(format!(
        "shipped via {} to {}",
        order.shipping_method,
        order.shipping_address.to_string().replace('\n', ", ")
    ));

    for event in &order.events {
        match &event.note {
            Some(note) => out.push(format!("  {} {} ({note})", event.at, event.status)),
            None => out.push(format!("  {} {}", event.at, event.status)),
        }
    }

    summary_lines(&order.summary, &mut out);

    out.join("\n")
}

fn adjustments(adjustments: &[StockAdjustment]) -> Vec<String> {
    adjustments
        .iter()
        .map(|adjustment| match adjustment {
            StockAdjustment::Removed { sku, .. } => {
                format!("! {sku} is no longer available and was removed")
            }
            StockAdjustment::Reduced { sku, from, to, .. } => {
                format!("! only {to} of {sku} left, reduced from {from}")
            }
        })
        .collect()
}

fn summary_lines(summary: &CartSummary, out: &mut Vec<String>) {
    out.push(format!("items:    {}", summary.item_count));
    out.push(format!("subtotal: {}", summary.subtotal));

    if summary.discount.is_positive() {
        out.push(format!("discount: -{}", summary.discount));
    }

    out.push(format!("shipping: {}", summary.shipping));
    out.push(format!("tax:      {}", summary.tax));
    out.push(format!("total:    {}", summary.total));
}
