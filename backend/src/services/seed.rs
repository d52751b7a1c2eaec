//! Demo data for a fresh database

use rust_decimal::Decimal;
use shared::{MachineStatus, StockUnit, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::AuthService;
use crate::config::SeedConfig;
use crate::error::AppResult;

const DEMO_EMAIL_DOMAIN: &str = "demo.fab-erp.in";

const DEMO_MACHINES: &[(&str, &str, &str)] = &[
    ("CUT-01", "Shearing Machine", "CUTTING"),
    ("SHP-01", "Roll Forming Machine", "SHAPING"),
    ("BND-01", "Press Brake 100T", "BENDING"),
    ("WLD-01", "MIG Welder", "WELDING"),
    ("GRD-01", "Angle Grinder Station", "GRINDING"),
    ("PNT-01", "Powder Coating Booth", "PAINTING"),
];

const DEMO_MATERIALS: &[(&str, StockUnit, i64, i64)] = &[
    ("MS Sheet 2mm", StockUnit::Sheet, 20, 2450),
    ("GI Sheet 1.2mm", StockUnit::Sheet, 15, 1980),
    ("MS Angle 40x40", StockUnit::Meter, 50, 185),
    ("Welding Wire 0.8mm", StockUnit::Kg, 10, 240),
    ("Powder Coat RAL 7035", StockUnit::Kg, 25, 420),
];

const DEMO_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Electrical Panel Box 600x400", 12, 5200),
    ("Steel Rack 5-Shelf", 8, 7800),
    ("Cable Tray 2m", 40, 950),
];

/// Populate a demo branch, one user per role, machines, materials and a store.
///
/// Does nothing once any user exists.
pub async fn run(db: &PgPool, seed: &SeedConfig) -> AppResult<()> {
    if !seed.enabled {
        return Ok(());
    }

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(db)
        .await?;
    if users > 0 {
        tracing::debug!(users, "Database already has users, skipping seed");
        return Ok(());
    }

    let password_hash = AuthService::hash_password(&seed.demo_password)?;
    let mut tx = db.begin().await?;

    let branch_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO branches (name, code, address, phone)
        VALUES ('Main Works', 'MAIN', 'Plot 14, MIDC Bhosari, Pune 411026', '9822012345')
        RETURNING id
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;

    for role in UserRole::ALL {
        let slug = role.as_str().to_lowercase();
        sqlx::query(
            r#"
            INSERT INTO users (branch_id, email, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(branch_id)
        .bind(format!("{}@{}", slug, DEMO_EMAIL_DOMAIN))
        .bind(&password_hash)
        .bind(format!("Demo {}", title_case(&slug)))
        .bind(role.as_str())
        .execute(&mut *tx)
        .await?;
    }

    for (code, name, machine_type) in DEMO_MACHINES {
        sqlx::query(
            "INSERT INTO machines (branch_id, code, name, machine_type, status) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(branch_id)
        .bind(*code)
        .bind(*name)
        .bind(*machine_type)
        .bind(MachineStatus::Active.as_str())
        .execute(&mut *tx)
        .await?;
    }

    for (name, unit, reorder_level, unit_cost) in DEMO_MATERIALS {
        sqlx::query(
            "INSERT INTO raw_materials (name, unit, quantity, reorder_level, unit_cost) VALUES ($1, $2, 0, $3, $4)",
        )
        .bind(*name)
        .bind(unit.as_str())
        .bind(Decimal::from(*reorder_level))
        .bind(Decimal::from(*unit_cost))
        .execute(&mut *tx)
        .await?;
    }

    let store_id: Uuid = sqlx::query_scalar(
        "INSERT INTO stores (branch_id, name, location) VALUES ($1, 'Factory Outlet', 'Main Works gate') RETURNING id",
    )
    .bind(branch_id)
    .fetch_one(&mut *tx)
    .await?;

    for (product, quantity, price) in DEMO_PRODUCTS {
        sqlx::query(
            "INSERT INTO store_inventory (store_id, product_name, quantity, unit_price) VALUES ($1, $2, $3, $4)",
        )
        .bind(store_id)
        .bind(*product)
        .bind(Decimal::from(*quantity))
        .bind(Decimal::from(*price))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO employees (branch_id, name, designation, phone, daily_wage)
        VALUES ($1, 'Ramesh Patil', 'Welder', '9890011223', 850),
               ($1, 'Sunil Jadhav', 'Press Operator', '9890044556', 750)
        "#,
    )
    .bind(branch_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        users = UserRole::ALL.len(),
        machines = DEMO_MACHINES.len(),
        materials = DEMO_MATERIALS.len(),
        "Demo data seeded"
    );
    Ok(())
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalises_first_letter() {
        assert_eq!(title_case("accountant"), "Accountant");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn demo_machine_codes_are_unique() {
        let mut codes: Vec<_> = DEMO_MACHINES.iter().map(|(code, _, _)| *code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), DEMO_MACHINES.len());
    }
}
