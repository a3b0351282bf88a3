//! Fee billing and collection example

use bigdecimal::BigDecimal;
use bursar_core::{
    Components, FeeComponents, Ledger, MemoryStore, PaymentDraft, PaymentFilter, PaymentMode,
    Period,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎓 Bursar Core - Fee Ledger Example\n");

    let store = MemoryStore::new();
    let mut ledger = Ledger::new(store);

    // 1. The accountant publishes the fee structure for semester 1
    println!("📋 Publishing fee structure...");
    let structure = ledger
        .create_structure(
            "fee-cs-sem1".to_string(),
            "course-cs".to_string(),
            Period::Semester(1),
            Components::Fee(FeeComponents {
                tuition: BigDecimal::from(60000),
                library: BigDecimal::from(5000),
                exam: BigDecimal::from(3000),
                other: BigDecimal::from(7000),
                due_date: NaiveDate::from_ymd_opt(2024, 7, 31).unwrap(),
            }),
        )
        .await?;
    println!(
        "  ✓ {} for {}: total {}\n",
        structure.id,
        structure.period,
        structure.total()
    );

    // 2. The student pays in two installments
    println!("💰 Recording payments...");
    let first = ledger
        .record_payment(
            &structure.id,
            PaymentDraft::new(
                BigDecimal::from(30000),
                NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
                PaymentMode::Online,
            )
            .transaction_id("TXN-48213")
            .remarks("First installment"),
        )
        .await?;
    println!("  ✓ {} paid, status {:?}", first.amount, first.status);

    let second = ledger
        .record_payment(
            &structure.id,
            PaymentDraft::new(
                BigDecimal::from(45000),
                NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
                PaymentMode::BankTransfer,
            )
            .transaction_id("TXN-51877"),
        )
        .await?;
    println!("  ✓ {} paid, status {:?}\n", second.amount, second.status);

    // 3. Reconcile
    println!("🧮 Settlement summary:");
    let summary = ledger.summarize(&structure.id).await?;
    println!(
        "  owed {}, paid {}, pending {}, status {:?}\n",
        summary.total_owed, summary.total_paid, summary.pending, summary.status
    );

    // 4. Recent transactions, newest first
    println!("🧾 Recent transactions:");
    let records = ledger
        .list_payments(&PaymentFilter::for_subject("course-cs"))
        .await?;
    for record in records {
        println!(
            "  {} | {} | {:?} | {:?}",
            record.date, record.amount, record.mode, record.status
        );
    }

    Ok(())
}
