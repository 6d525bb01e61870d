//! Synthetic demo data
//!
//! Seeds five deterministic user profiles, one per persona archetype, with
//! account and transaction history laid out relative to an anchor date.
//! Used by `finch seed`, the demo environment, and the integration tests.

use chrono::{Duration, NaiveDate};

use crate::db::Database;
use crate::error::Result;
use crate::models::{Account, AccountKind, Liability, Transaction};

/// Card at 80% utilization with regular income
pub const HIGH_UTILIZATION_USER: &str = "user-highutil";
/// Invoices ~52 days apart with a thin cash buffer
pub const VARIABLE_INCOME_USER: &str = "user-variable";
/// Four recurring services on a stable paycheck
pub const SUBSCRIPTION_HEAVY_USER: &str = "user-subs";
/// Steady saver with a barely-used card
pub const SAVINGS_BUILDER_USER: &str = "user-saver";
/// Joined today with one checking account
pub const NEW_USER: &str = "user-new";

/// All seeded user ids
pub const DEMO_USERS: &[&str] = &[
    HIGH_UTILIZATION_USER,
    VARIABLE_INCOME_USER,
    SUBSCRIPTION_HEAVY_USER,
    SAVINGS_BUILDER_USER,
    NEW_USER,
];

struct TxSpec<'a> {
    account_id: &'a str,
    days_ago: i64,
    amount: f64,
    merchant: &'a str,
    category: Option<&'a str>,
}

fn insert_txs(db: &Database, anchor: NaiveDate, prefix: &str, specs: &[TxSpec<'_>]) -> Result<()> {
    for (index, spec) in specs.iter().enumerate() {
        db.upsert_transaction(&Transaction {
            transaction_id: format!("{}-{:03}", prefix, index),
            account_id: spec.account_id.to_string(),
            date: anchor - Duration::days(spec.days_ago),
            amount: spec.amount,
            merchant_name: spec.merchant.to_string(),
            category: spec.category.map(|c| c.to_string()),
            pending: false,
        })?;
    }
    Ok(())
}

fn depository(account_id: &str, user_id: &str, name: &str, subtype: &str, balance: f64) -> Account {
    Account {
        account_id: account_id.to_string(),
        user_id: user_id.to_string(),
        name: name.to_string(),
        kind: AccountKind::Depository,
        subtype: Some(subtype.to_string()),
        available_balance: balance,
        current_balance: balance,
        credit_limit: None,
    }
}

fn credit_card(account_id: &str, user_id: &str, balance: f64, limit: f64) -> Account {
    Account {
        account_id: account_id.to_string(),
        user_id: user_id.to_string(),
        name: "Credit Card".to_string(),
        kind: AccountKind::Credit,
        subtype: Some("credit_card".to_string()),
        available_balance: limit - balance,
        current_balance: balance,
        credit_limit: Some(limit),
    }
}

fn user_created(db: &Database, user_id: &str, name: &str, anchor: NaiveDate, age_days: i64) -> Result<()> {
    let created_at = (anchor - Duration::days(age_days))
        .and_hms_opt(9, 0, 0)
        .expect("valid time")
        .and_utc();
    db.insert_user_created_at(user_id, name, true, created_at)
}

/// Seed all five demo profiles relative to `anchor` (normally today)
pub fn seed_demo_users(db: &Database, anchor: NaiveDate) -> Result<Vec<&'static str>> {
    seed_high_utilization(db, anchor)?;
    seed_variable_income(db, anchor)?;
    seed_subscription_heavy(db, anchor)?;
    seed_savings_builder(db, anchor)?;
    seed_new_user(db, anchor)?;
    tracing::info!(users = DEMO_USERS.len(), "Demo data seeded");
    Ok(DEMO_USERS.to_vec())
}

fn seed_high_utilization(db: &Database, anchor: NaiveDate) -> Result<()> {
    let user = HIGH_UTILIZATION_USER;
    user_created(db, user, "Jordan Reyes", anchor, 540)?;
    db.upsert_account(&depository("chk-1001", user, "Everyday Checking", "checking", 1850.0))?;
    db.upsert_account(&credit_card("card-9321", user, 4000.0, 5000.0))?;
    db.upsert_liability(&Liability {
        account_id: "card-9321".to_string(),
        apr: Some(26.99),
        minimum_payment_amount: Some(120.0),
        is_overdue: false,
        last_statement_balance: Some(3950.0),
        next_payment_due_date: Some(anchor + Duration::days(12)),
    })?;

    let mut specs = Vec::new();
    // Biweekly payroll
    for i in 0..12 {
        specs.push(TxSpec {
            account_id: "chk-1001",
            days_ago: 7 + 14 * i,
            amount: 2200.0,
            merchant: "ACME CORP PAYROLL",
            category: Some("income"),
        });
    }
    // Irregular groceries and fuel - no cadence
    for (i, days_ago) in [3, 16, 24, 41, 58, 66, 83, 107, 126, 149].iter().enumerate() {
        specs.push(TxSpec {
            account_id: "chk-1001",
            days_ago: *days_ago,
            amount: -(92.0 + 11.0 * (i % 4) as f64),
            merchant: "WHOLE FOODS MARKET",
            category: Some("groceries"),
        });
    }
    // Card purchases and a payment comfortably above the minimum
    specs.push(TxSpec {
        account_id: "card-9321",
        days_ago: 9,
        amount: -310.0,
        merchant: "SOUTHWEST AIRLINES",
        category: Some("travel"),
    });
    specs.push(TxSpec {
        account_id: "card-9321",
        days_ago: 21,
        amount: 250.0,
        merchant: "PAYMENT THANK YOU",
        category: Some("payment"),
    });
    insert_txs(db, anchor, "highutil", &specs)
}

fn seed_variable_income(db: &Database, anchor: NaiveDate) -> Result<()> {
    let user = VARIABLE_INCOME_USER;
    user_created(db, user, "Sam Okafor", anchor, 420)?;
    db.upsert_account(&depository("chk-1102", user, "Freelance Checking", "checking", 610.0))?;

    let mut specs = Vec::new();
    // Client payments ~52 days apart
    for days_ago in [170, 118, 62, 10] {
        specs.push(TxSpec {
            account_id: "chk-1102",
            days_ago,
            amount: 1800.0,
            merchant: "UPWORK CLIENT PAYMENT",
            category: Some("income"),
        });
    }
    // Monthly rent plus irregular living costs; ~$900/month total
    for i in 0..6 {
        specs.push(TxSpec {
            account_id: "chk-1102",
            days_ago: 4 + 30 * i,
            amount: -750.0,
            merchant: "OAKWOOD PROPERTIES RENT",
            category: Some("rent"),
        });
    }
    for (i, days_ago) in [8, 19, 33, 52, 71, 95, 122, 153].iter().enumerate() {
        specs.push(TxSpec {
            account_id: "chk-1102",
            days_ago: *days_ago,
            amount: -(98.0 + 17.0 * (i % 3) as f64),
            merchant: "FOODSCO",
            category: Some("groceries"),
        });
    }
    insert_txs(db, anchor, "variable", &specs)
}

fn seed_subscription_heavy(db: &Database, anchor: NaiveDate) -> Result<()> {
    let user = SUBSCRIPTION_HEAVY_USER;
    user_created(db, user, "Riley Chen", anchor, 720)?;
    db.upsert_account(&depository("chk-1203", user, "Main Checking", "checking", 3200.0))?;

    let mut specs = Vec::new();
    for i in 0..12 {
        specs.push(TxSpec {
            account_id: "chk-1203",
            days_ago: 5 + 14 * i,
            amount: 1900.0,
            merchant: "BRIGHTWAVE PAYROLL",
            category: Some("income"),
        });
    }
    // Four monthly services, staggered through the month
    let services: [(&str, f64, i64); 4] = [
        ("NETFLIX.COM", 15.49, 2),
        ("SPOTIFY USA", 10.99, 9),
        ("HULU", 17.99, 14),
        ("CITY FITNESS", 25.00, 20),
    ];
    for (merchant, amount, day) in services {
        for i in 0..6 {
            specs.push(TxSpec {
                account_id: "chk-1203",
                days_ago: day + 30 * i,
                amount: -amount,
                merchant,
                category: Some("subscriptions"),
            });
        }
    }
    for (i, days_ago) in [6, 17, 29, 47, 63, 88, 104, 131, 160].iter().enumerate() {
        specs.push(TxSpec {
            account_id: "chk-1203",
            days_ago: *days_ago,
            amount: -(120.0 + 23.0 * (i % 3) as f64),
            merchant: "SAFEWAY",
            category: Some("groceries"),
        });
    }
    insert_txs(db, anchor, "subs", &specs)
}

fn seed_savings_builder(db: &Database, anchor: NaiveDate) -> Result<()> {
    let user = SAVINGS_BUILDER_USER;
    user_created(db, user, "Priya Natarajan", anchor, 980)?;
    db.upsert_account(&depository("chk-1304", user, "Checking", "checking", 2600.0))?;
    db.upsert_account(&depository("sav-4410", user, "Rainy Day Fund", "savings", 9000.0))?;
    db.upsert_account(&credit_card("card-2206", user, 240.0, 6000.0))?;
    db.upsert_liability(&Liability {
        account_id: "card-2206".to_string(),
        apr: Some(19.49),
        minimum_payment_amount: Some(35.0),
        is_overdue: false,
        last_statement_balance: Some(260.0),
        next_payment_due_date: Some(anchor + Duration::days(18)),
    })?;

    let mut specs = Vec::new();
    // Semimonthly payroll
    for i in 0..12 {
        specs.push(TxSpec {
            account_id: "chk-1304",
            days_ago: 3 + 15 * i,
            amount: 2500.0,
            merchant: "LUMEN HEALTH PAYROLL",
            category: Some("income"),
        });
    }
    // Savings transfers land when there is room, not on a fixed day
    for days_ago in [6i64, 31, 70, 86, 130, 155] {
        specs.push(TxSpec {
            account_id: "sav-4410",
            days_ago,
            amount: 400.0,
            merchant: "AUTO TRANSFER FROM CHECKING",
            category: Some("transfer"),
        });
        specs.push(TxSpec {
            account_id: "chk-1304",
            days_ago,
            amount: -400.0,
            merchant: "AUTO TRANSFER TO SAVINGS",
            category: Some("transfer"),
        });
    }
    // Monthly rent, card payments, and irregular warehouse runs
    for i in 0..6 {
        specs.push(TxSpec {
            account_id: "chk-1304",
            days_ago: 2 + 30 * i,
            amount: -1400.0,
            merchant: "PARKSIDE LOFTS RENT",
            category: Some("rent"),
        });
        specs.push(TxSpec {
            account_id: "card-2206",
            days_ago: 11 + 30 * i,
            amount: 300.0,
            merchant: "PAYMENT THANK YOU",
            category: Some("payment"),
        });
    }
    for (i, days_ago) in [16i64, 39, 81, 95, 143, 170].iter().enumerate() {
        specs.push(TxSpec {
            account_id: "card-2206",
            days_ago: *days_ago,
            amount: -(180.0 + 40.0 * (i % 2) as f64),
            merchant: "COSTCO WHOLESALE",
            category: Some("groceries"),
        });
    }
    // One music subscription - well under the subscription-heavy bar
    for i in 0..6 {
        specs.push(TxSpec {
            account_id: "chk-1304",
            days_ago: 12 + 30 * i,
            amount: -10.99,
            merchant: "SPOTIFY USA",
            category: Some("subscriptions"),
        });
    }
    for (i, days_ago) in [4, 21, 38, 59, 82, 115, 141, 167].iter().enumerate() {
        specs.push(TxSpec {
            account_id: "chk-1304",
            days_ago: *days_ago,
            amount: -(210.0 + 35.0 * (i % 3) as f64),
            merchant: "TRADER JOES",
            category: Some("groceries"),
        });
    }
    insert_txs(db, anchor, "saver", &specs)
}

fn seed_new_user(db: &Database, anchor: NaiveDate) -> Result<()> {
    let user = NEW_USER;
    user_created(db, user, "Alex Morgan", anchor, 0)?;
    db.upsert_account(&depository("chk-1405", user, "First Checking", "checking", 800.0))?;

    let specs = [
        TxSpec {
            account_id: "chk-1405",
            days_ago: 5,
            amount: 100.0,
            merchant: "MOBILE DEPOSIT",
            category: Some("deposit"),
        },
        TxSpec {
            account_id: "chk-1405",
            days_ago: 3,
            amount: -45.0,
            merchant: "TARGET",
            category: Some("shopping"),
        },
        TxSpec {
            account_id: "chk-1405",
            days_ago: 2,
            amount: -30.0,
            merchant: "SHELL OIL",
            category: Some("fuel"),
        },
        TxSpec {
            account_id: "chk-1405",
            days_ago: 1,
            amount: -62.0,
            merchant: "TRADER JOES",
            category: Some("groceries"),
        },
    ];
    insert_txs(db, anchor, "new", &specs)
}
