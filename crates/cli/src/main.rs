//! Runs a scripted service-order lifecycle and prints the customer report as JSON.
//!
//! Usage: `servicedesk [NAME] [EMAIL]`

use anyhow::Context;
use rust_decimal::Decimal;

use servicedesk_core::{CustomerId, Email, Money, ServiceOrderId};
use servicedesk_service_orders::{Customer, CustomerSummary, ServiceItem};

fn main() -> anyhow::Result<()> {
    servicedesk_observability::init();

    let mut args = std::env::args().skip(1);
    let name = args.next().unwrap_or_else(|| "Ana".to_string());
    let email = args.next().unwrap_or_else(|| "ana@example.com".to_string());

    let customer = run_scenario(name, email)?;
    let report = CustomerSummary::try_from(&customer)?;

    tracing::info!(
        customer_id = %report.customer_id,
        orders = report.orders.len(),
        completed_total = %report.completed_total,
        "scenario finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_scenario(name: String, email: String) -> anyhow::Result<Customer> {
    let email = Email::new(email).context("customer email")?;
    let mut customer = Customer::new(CustomerId::new(1), name, email).context("customer")?;

    let mut repair = customer.open_order(ServiceOrderId::new(1))?;
    repair.add_item(ServiceItem::new("Screen replacement", price(100)?, 2)?)?;
    repair.add_item(ServiceItem::new("Diagnosis", price(50)?, 1)?)?;
    repair.start()?;
    repair.complete()?;

    let mut visit = customer.open_order(ServiceOrderId::new(2))?;
    visit.add_item(ServiceItem::new("On-site visit", price(80)?, 1)?)?;
    visit.cancel()?;
    if let Err(err) = visit.start() {
        tracing::info!(order_id = 2, error = %err, "cancelled order stays cancelled");
    }

    let mut pending = customer.open_order(ServiceOrderId::new(3))?;
    pending.add_item(ServiceItem::new("Battery check", price(30)?, 1)?)?;

    Ok(customer)
}

fn price(amount: i64) -> anyhow::Result<Money> {
    Ok(Money::new(Decimal::from(amount))?)
}
