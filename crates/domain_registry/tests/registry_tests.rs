//! Product and client registry tests over the in-memory adapters

use rust_decimal_macros::dec;

use core_kernel::Money;
use domain_registry::{ClientUpdate, ProductUpdate, RegistryError};
use test_utils::{
    admin_actor, manager_actor, reception_actor, sales_actor, ClientBuilder, ProductBuilder,
    TestBackOffice, VALID_CPF_CANONICAL,
};

mod products {
    use super::*;

    #[tokio::test]
    async fn create_and_list() {
        let office = TestBackOffice::new();
        let manager = manager_actor();

        let product = office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .unwrap();
        assert!(product.active);

        let listed = office.products.list_products(&manager).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, product.id);
    }

    #[tokio::test]
    async fn non_positive_price_is_rejected() {
        let office = TestBackOffice::new();
        let manager = manager_actor();

        let err = office
            .products
            .create_product(
                &manager,
                ProductBuilder::new().price(Money::brl(dec!(0))).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));

        let err = office
            .products
            .create_product(
                &manager,
                ProductBuilder::new().price(Money::brl(dec!(-5))).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[tokio::test]
    async fn code_is_unique_among_active_products_only() {
        let office = TestBackOffice::new();
        let manager = manager_actor();

        let first = office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .unwrap();

        // Same code while the first is active: conflict.
        let err = office
            .products
            .create_product(&manager, ProductBuilder::new().name("OUTRO NOME").build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));

        // After soft-deleting the first, the code is free again.
        office
            .products
            .deactivate_product(&manager, first.id)
            .await
            .unwrap();
        assert!(office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn deactivation_is_a_tombstone_not_a_delete() {
        let office = TestBackOffice::new();
        let manager = manager_actor();

        let product = office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .unwrap();
        office
            .products
            .deactivate_product(&manager, product.id)
            .await
            .unwrap();

        // Gone from the active list, still present in the store.
        assert!(office
            .products
            .list_products(&manager)
            .await
            .unwrap()
            .is_empty());
        assert!(office.products_store.stock_of(product.id).is_some());

        // Deactivating again is a business-rule violation.
        let err = office
            .products
            .deactivate_product(&manager, product.id)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn update_price_and_stock() {
        let office = TestBackOffice::new();
        let manager = manager_actor();

        let product = office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .unwrap();

        let updated = office
            .products
            .update_product(
                &manager,
                product.id,
                ProductUpdate {
                    price: Some(Money::brl(dec!(149.90))),
                    stock: Some(Some(10)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price.amount(), dec!(149.90));
        assert_eq!(updated.stock, Some(10));
    }

    #[tokio::test]
    async fn sales_may_view_but_not_manage() {
        let office = TestBackOffice::new();
        let manager = manager_actor();
        let sales = sales_actor();

        office
            .products
            .create_product(&manager, ProductBuilder::new().build())
            .await
            .unwrap();

        assert_eq!(office.products.list_products(&sales).await.unwrap().len(), 1);

        let err = office
            .products
            .create_product(&sales, ProductBuilder::new().code("X2").name("X2").build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Denied(_)));
    }
}

mod clients {
    use super::*;

    #[tokio::test]
    async fn cpf_is_stored_canonically() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let client = office
            .clients
            .create_client(&admin, ClientBuilder::new().build())
            .await
            .unwrap();
        assert_eq!(client.cpf, VALID_CPF_CANONICAL);
        assert_eq!(client.created_by, admin.id);
    }

    #[tokio::test]
    async fn invalid_cpf_is_rejected() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .clients
            .create_client(&admin, ClientBuilder::new().cpf("12345678900").build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .clients
            .create_client(&admin, ClientBuilder::new().email("sem-arroba").build())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[tokio::test]
    async fn email_is_unique_case_insensitively() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        office
            .clients
            .create_client(&admin, ClientBuilder::new().build())
            .await
            .unwrap();

        let err = office
            .clients
            .create_client(
                &admin,
                ClientBuilder::new()
                    .email("JOAO@EMAIL.COM")
                    .cpf(test_utils::VALID_CPF_2)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)));
    }

    #[tokio::test]
    async fn sales_role_may_create_and_update_clients() {
        let office = TestBackOffice::new();
        let sales = sales_actor();

        let client = office
            .clients
            .create_client(&sales, ClientBuilder::new().build())
            .await
            .unwrap();

        let updated = office
            .clients
            .update_client(
                &sales,
                client.id,
                ClientUpdate {
                    phone: Some(Some("11988887777".to_string())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone.as_deref(), Some("11988887777"));
    }

    #[tokio::test]
    async fn reception_reads_but_needs_grant_to_write() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let reception = reception_actor();

        office
            .clients
            .create_client(&admin, ClientBuilder::new().build())
            .await
            .unwrap();

        // Baseline read works.
        assert_eq!(
            office.clients.list_clients(&reception).await.unwrap().len(),
            1
        );

        // Write without the grant is denied.
        let err = office
            .clients
            .create_client(
                &reception,
                ClientBuilder::new()
                    .email("novo@email.com")
                    .cpf(test_utils::VALID_CPF_2)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Denied(_)));
    }

    #[tokio::test]
    async fn updating_missing_client_is_not_found() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .clients
            .update_client(&admin, core_kernel::ClientId::new(), ClientUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }
}
