//! Payroll disbursement example

use bigdecimal::BigDecimal;
use bursar_core::{
    Components, DisbursementOutcome, Ledger, MemoryStore, PaymentDraft, PaymentMode, Period,
    SalaryComponents,
};
use chrono::NaiveDate;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Bursar Core - Salary Ledger Example\n");

    let store = MemoryStore::new();
    let mut ledger = Ledger::new(store);

    // 1. Salary structure for June
    println!("📋 Creating salary structure...");
    let june = ledger
        .create_structure(
            "sal-f42-2024-06".to_string(),
            "faculty-42".to_string(),
            Period::Month {
                year: 2024,
                month: 6,
            },
            Components::Salary(SalaryComponents {
                base: BigDecimal::from(40000),
                hra: BigDecimal::from(8000),
                da: BigDecimal::from(4000),
                allowances: BigDecimal::from(2000),
                deductions: BigDecimal::from(3000),
            }),
        )
        .await?;
    println!("  ✓ {}: net salary {}\n", june.id, june.total());

    // 2. The disbursement channel reports an in-flight transfer
    println!("💸 Disbursing...");
    let attempt = ledger
        .record_disbursement(
            &june.id,
            PaymentDraft::new(
                BigDecimal::from(51000),
                NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
                PaymentMode::BankTransfer,
            )
            .transaction_id("NEFT-90412"),
            DisbursementOutcome::InFlight,
        )
        .await?;
    println!("  ✓ attempt {} is {:?}", attempt.id, attempt.status);

    // 3. The channel later confirms settlement
    let resolved = ledger
        .report_outcome(&attempt.id, DisbursementOutcome::Settled)
        .await?;
    println!("  ✓ attempt resolved as {:?}\n", resolved.status);

    // 4. Revision for July: base raised, old version stays on record
    println!("📈 Salary revision for July...");
    let july = ledger
        .supersede_structure(
            "faculty-42".to_string(),
            Period::Month {
                year: 2024,
                month: 7,
            },
            Components::Salary(SalaryComponents {
                base: BigDecimal::from(45000),
                hra: BigDecimal::from(8000),
                da: BigDecimal::from(4000),
                allowances: BigDecimal::from(2000),
                deductions: BigDecimal::from(3000),
            }),
        )
        .await?;
    println!("  ✓ {}: net salary {}\n", july.id, july.total());

    // 5. The employee's statement across both months
    println!("🧾 Statement for faculty-42:");
    let statement = ledger.statement("faculty-42").await?;
    for row in &statement.rows {
        println!(
            "  {} | owed {} | paid {} | {:?}",
            row.period, row.total_owed, row.total_paid, row.status
        );
    }
    println!(
        "  totals: owed {}, paid {}, pending {}",
        statement.total_owed, statement.total_paid, statement.total_pending
    );

    Ok(())
}
