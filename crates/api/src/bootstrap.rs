//! Startup tasks: admin provisioning and demo catalog seeding.

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use sweetshop_auth::{AuthService, CredentialError, RegisterUser, Role};
use sweetshop_catalog::{CatalogError, CatalogService, NewSweet};

use crate::config::AdminBootstrap;

/// Demo catalog: (name, category, price, quantity).
pub const DEMO_SWEETS: [(&str, &str, f64, i64); 5] = [
    ("Dark Heaven Chocolate", "Chocolate", 5.99, 50),
    ("Rainbow Lollipop", "Candy", 1.50, 100),
    ("Strawberry Cheesecake", "Cake", 25.00, 10),
    ("Gummy Bears", "Candy", 3.00, 200),
    ("Hazelnut Truffle", "Chocolate", 8.50, 40),
];

/// Create the ADMIN account unless its email is already registered.
///
/// Returns whether an account was created. An existing account is left as is,
/// whatever its role.
pub async fn ensure_admin(
    auth: &AuthService,
    admin: &AdminBootstrap,
    now: DateTime<Utc>,
) -> Result<bool, CredentialError> {
    let req = RegisterUser::new(&admin.name, &admin.email, &admin.password);
    match auth.provision(req, Role::Admin, now).await {
        Ok(profile) => {
            info!(user_id = %profile.id, "admin account provisioned");
            Ok(true)
        }
        Err(CredentialError::DuplicateEmail) => {
            info!("admin account already present");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Insert `DEMO_SWEETS` when the catalog is empty; returns how many were added.
pub async fn seed_demo_sweets(
    catalog: &CatalogService,
    now: DateTime<Utc>,
) -> Result<usize, CatalogError> {
    if catalog.count().await? > 0 {
        return Ok(0);
    }

    for (i, (name, category, price, quantity)) in DEMO_SWEETS.iter().enumerate() {
        let new = NewSweet {
            name: name.to_string(),
            category: category.to_string(),
            price: *price,
            quantity: *quantity,
        };
        // Distinct timestamps keep listing order equal to seed order.
        catalog
            .create(new, now + Duration::milliseconds(i as i64))
            .await?;
    }

    info!(count = DEMO_SWEETS.len(), "demo catalog seeded");
    Ok(DEMO_SWEETS.len())
}
