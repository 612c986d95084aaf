//! Integration tests for the services wired onto the in-memory stores.
//!
//! Verifies:
//! - Purchase/restock keep quantity non-negative under concurrency
//! - Search filters compose
//! - Registration, login and token authentication end to end

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};

    use sweetshop_auth::{
        AuthConfig, AuthError, AuthService, CredentialError, HashingCost, RegisterUser, Role,
    };
    use sweetshop_catalog::{CatalogError, CatalogService, NewSweet, Page, SweetPatch, SweetQuery};
    use sweetshop_core::SweetId;

    use crate::{InMemorySweetStore, InMemoryUserStore};

    fn catalog() -> CatalogService {
        CatalogService::new(Arc::new(InMemorySweetStore::new()))
    }

    fn auth() -> AuthService {
        let config = AuthConfig::new("integration-secret").with_hashing(HashingCost::minimal());
        AuthService::new(Arc::new(InMemoryUserStore::new()), &config).unwrap()
    }

    fn new_sweet(name: &str, category: &str, price: f64, quantity: i64) -> NewSweet {
        NewSweet {
            name: name.to_string(),
            category: category.to_string(),
            price,
            quantity,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn purchase_decrements_by_one() {
        let svc = catalog();
        let bar = svc
            .create(new_sweet("Candy Bar", "Chocolate", 1.5, 10), Utc::now())
            .await
            .unwrap();

        assert_eq!(svc.purchase(bar.id, Utc::now()).await.unwrap(), 9);
        assert_eq!(svc.get(bar.id).await.unwrap().quantity, 9);
    }

    #[tokio::test]
    async fn purchase_at_zero_is_out_of_stock_and_changes_nothing() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Mint", "Candy", 0.5, 0), Utc::now())
            .await
            .unwrap();

        let err = svc.purchase(s.id, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::OutOfStock {
                requested: 1,
                available: 0
            }
        ));
        assert_eq!(svc.get(s.id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn purchase_and_restock_of_unknown_sweet_is_not_found() {
        let svc = catalog();
        let ghost = SweetId::new();

        assert!(matches!(
            svc.purchase(ghost, Utc::now()).await,
            Err(CatalogError::NotFound)
        ));
        assert!(matches!(
            svc.restock(ghost, 5, Utc::now()).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn restock_adds_and_rejects_non_positive_amounts() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Toffee", "Candy", 2.0, 3), Utc::now())
            .await
            .unwrap();

        assert_eq!(svc.restock(s.id, 7, Utc::now()).await.unwrap(), 10);
        assert!(matches!(
            svc.restock(s.id, 0, Utc::now()).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            svc.restock(s.id, -4, Utc::now()).await,
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(svc.get(s.id).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn purchase_then_restock_one_restores_quantity() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Fudge", "Candy", 4.0, 5), Utc::now())
            .await
            .unwrap();

        svc.purchase(s.id, Utc::now()).await.unwrap();
        assert_eq!(svc.restock(s.id, 1, Utc::now()).await.unwrap(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_purchases_never_oversell() {
        const STOCK: i64 = 25;

        let svc = catalog();
        let s = svc
            .create(new_sweet("Truffle", "Chocolate", 8.5, STOCK), Utc::now())
            .await
            .unwrap();

        let handles: Vec<_> = (0..STOCK + 10)
            .map(|_| {
                let svc = svc.clone();
                tokio::spawn(async move { svc.purchase(s.id, Utc::now()).await })
            })
            .collect();

        let mut applied = 0;
        let mut rejected = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => applied += 1,
                Err(CatalogError::OutOfStock { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(applied, STOCK);
        assert_eq!(rejected, 10);
        assert_eq!(svc.get(s.id).await.unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn partial_update_changes_only_supplied_fields() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Lolly", "Candy", 1.0, 4), Utc::now())
            .await
            .unwrap();

        let later = s.updated_at + Duration::seconds(5);
        let patch = SweetPatch {
            price: Some(1.25),
            ..SweetPatch::default()
        };
        let updated = svc.update(s.id, patch, later).await.unwrap();

        assert_eq!(updated.price, 1.25);
        assert_eq!(updated.name, "Lolly");
        assert_eq!(updated.quantity, 4);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.created_at, s.created_at);
    }

    #[tokio::test]
    async fn update_rejects_negative_price_and_unknown_id() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Lolly", "Candy", 1.0, 4), Utc::now())
            .await
            .unwrap();

        let bad = SweetPatch {
            price: Some(-1.0),
            ..SweetPatch::default()
        };
        assert!(matches!(
            svc.update(s.id, bad, Utc::now()).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            svc.update(SweetId::new(), SweetPatch::default(), Utc::now()).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_removes_and_second_delete_is_not_found() {
        let svc = catalog();
        let s = svc
            .create(new_sweet("Nougat", "Candy", 3.0, 1), Utc::now())
            .await
            .unwrap();

        svc.delete(s.id).await.unwrap();
        assert!(matches!(svc.get(s.id).await, Err(CatalogError::NotFound)));
        assert!(matches!(svc.delete(s.id).await, Err(CatalogError::NotFound)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input() {
        let svc = catalog();
        assert!(matches!(
            svc.create(new_sweet("", "Candy", 1.0, 1), Utc::now()).await,
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            svc.create(new_sweet("X", "Candy", 1.0, -1), Utc::now()).await,
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(svc.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn search_filters_compose() {
        let svc = catalog();
        let t0 = Utc::now();
        for (i, (name, cat, price)) in [
            ("Dark Heaven Chocolate", "Chocolate", 5.99),
            ("Rainbow Lollipop", "Candy", 1.50),
            ("Gummy Bears", "Candy", 3.00),
            ("Hazelnut Truffle", "Chocolate", 8.50),
        ]
        .into_iter()
        .enumerate()
        {
            svc.create(new_sweet(name, cat, price, 10), t0 + Duration::seconds(i as i64))
                .await
                .unwrap();
        }

        let names = |v: Vec<sweetshop_catalog::Sweet>| -> Vec<String> {
            v.into_iter().map(|s| s.name).collect()
        };

        let by_name = SweetQuery {
            name: Some("CHOC".into()),
            ..SweetQuery::default()
        };
        assert_eq!(names(svc.search(by_name).await.unwrap()), vec!["Dark Heaven Chocolate"]);

        let candy_under_2 = SweetQuery {
            category: Some("Candy".into()),
            price_max: Some(2.0),
            ..SweetQuery::default()
        };
        assert_eq!(names(svc.search(candy_under_2).await.unwrap()), vec!["Rainbow Lollipop"]);

        let inclusive = SweetQuery {
            price_min: Some(3.0),
            price_max: Some(5.99),
            ..SweetQuery::default()
        };
        assert_eq!(
            names(svc.search(inclusive).await.unwrap()),
            vec!["Dark Heaven Chocolate", "Gummy Bears"]
        );

        let inverted = SweetQuery {
            price_min: Some(9.0),
            price_max: Some(1.0),
            ..SweetQuery::default()
        };
        assert!(svc.search(inverted).await.unwrap().is_empty());

        assert_eq!(svc.search(SweetQuery::default()).await.unwrap().len(), 4);
        assert_eq!(svc.list(Page::new(Some(3), None)).await.unwrap().len(), 1);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn register_login_authenticate_round_trip() {
        let svc = auth();
        let now = Utc::now();

        let profile = svc
            .register(RegisterUser::new("Ana", "ana@example.com", "pw"), now)
            .await
            .unwrap();
        assert_eq!(profile.role, Role::User);

        let token = svc.login("ana@example.com", "pw", now).await.unwrap();
        assert_eq!(token.token_type, "bearer");

        let identity = svc.authenticate(&token.access_token, now).await.unwrap();
        assert_eq!(identity.id, profile.id);
        assert_eq!(identity.role, Role::User);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let svc = auth();
        let now = Utc::now();
        svc.register(RegisterUser::new("A", "a@example.com", "pw"), now)
            .await
            .unwrap();

        let err = svc
            .register(RegisterUser::new("B", "a@example.com", "other"), now)
            .await
            .unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateEmail));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let svc = auth();
        let now = Utc::now();
        svc.register(RegisterUser::new("A", "a@example.com", "pw"), now)
            .await
            .unwrap();

        let wrong = svc.login("a@example.com", "nope", now).await.unwrap_err();
        let unknown = svc.login("b@example.com", "pw", now).await.unwrap_err();
        assert!(matches!(wrong, CredentialError::InvalidCredentials));
        assert!(matches!(unknown, CredentialError::InvalidCredentials));
    }

    #[tokio::test]
    async fn token_stops_working_after_expiry() {
        let svc = auth();
        let now = Utc::now();
        svc.register(RegisterUser::new("A", "a@example.com", "pw"), now)
            .await
            .unwrap();
        let token = svc.login("a@example.com", "pw", now).await.unwrap();

        let later = now + Duration::seconds(token.expires_in + 1);
        assert!(matches!(
            svc.authenticate(&token.access_token, later).await,
            Err(AuthError::Expired)
        ));
    }

    #[tokio::test]
    async fn provisioned_admin_authenticates_as_admin() {
        let svc = auth();
        let now = Utc::now();
        svc.provision(RegisterUser::new("Root", "root@example.com", "pw"), Role::Admin, now)
            .await
            .unwrap();

        let token = svc.login("root@example.com", "pw", now).await.unwrap();
        let identity = svc.authenticate(&token.access_token, now).await.unwrap();
        assert_eq!(identity.role, Role::Admin);
    }
}
