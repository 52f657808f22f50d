//! Scenario tests for the billing engine, payment allocation and the ledger
//!
//! These run the real services over the in-memory adapters, exercising the
//! same authorize → validate → execute → audit path the API uses.

use rust_decimal_macros::dec;

use core_kernel::{ClientId, Money, ProductId};
use domain_access::Capability;
use domain_billing::{
    BillingError, InstallmentStatus, PaymentMethod, PendingFilter, TransactionFilter,
    TransactionKind,
};
use test_utils::{
    admin_actor, reception_actor, reception_actor_with, BillBuilder, ClientBuilder,
    ProductBuilder, TestBackOffice, TransactionBuilder, VALID_CPF_2,
};

async fn seed_client(office: &TestBackOffice) -> ClientId {
    let admin = admin_actor();
    office
        .clients
        .create_client(&admin, ClientBuilder::new().build())
        .await
        .expect("seed client")
        .id
}

async fn seed_product(office: &TestBackOffice) -> ProductId {
    let admin = admin_actor();
    office
        .products
        .create_product(&admin, ProductBuilder::new().build())
        .await
        .expect("seed product")
        .id
}

mod bill_creation {
    use super::*;

    #[tokio::test]
    async fn bill_of_300_in_3_installments() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;

        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();

        assert_eq!(created.installments.len(), 3);
        for (i, installment) in created.installments.iter().enumerate() {
            assert_eq!(installment.number, i as u32 + 1);
            assert_eq!(installment.amount.amount(), dec!(100.00));
            assert_eq!(installment.status, InstallmentStatus::Pending);
        }
        let expected_due = |n: i64| created.bill.created_at + chrono::Duration::days(30 * n);
        assert_eq!(created.installments[0].due_date, expected_due(1));
        assert_eq!(created.installments[1].due_date, expected_due(2));
        assert_eq!(created.installments[2].due_date, expected_due(3));
    }

    #[tokio::test]
    async fn product_price_overrides_supplied_total() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let product_id = seed_product(&office).await; // price 100.00

        let created = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .total(Some(Money::brl(dec!(999.00))))
                    .installments(12)
                    .build(),
            )
            .await
            .unwrap();

        assert_eq!(created.bill.total.amount(), dec!(100.00));
        assert_eq!(created.installments.len(), 12);
    }

    #[tokio::test]
    async fn missing_product_and_total_is_a_validation_failure() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;

        let err = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id).total(None).build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_installments_is_rejected_before_any_write() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let audit_before = office.audit.len();

        let err = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id).installments(0).build(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
        assert!(office.billing.list_bills(&admin).await.unwrap().is_empty());
        assert_eq!(office.audit.len(), audit_before);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(ClientId::new()).build())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::NotFound(_)));
    }

    #[tokio::test]
    async fn uneven_split_keeps_sum_exact() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;

        let created = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .total(Some(Money::brl(dec!(100.00))))
                    .installments(3)
                    .build(),
            )
            .await
            .unwrap();

        let amounts: Vec<_> = created
            .installments
            .iter()
            .map(|i| i.amount.amount())
            .collect();
        assert_eq!(amounts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
    }
}

mod installment_lifecycle {
    use super::*;

    /// The §8 walkthrough: pay #1, cancel the bill, watch the cascade hit
    /// the paid installment too, then fail to pay #2.
    #[tokio::test]
    async fn pay_cancel_cascade_scenario() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;

        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();

        // Pay installment #1 with cash.
        let first = created.installments[0].id;
        let paid = office
            .billing
            .pay_installment(&admin, first, PaymentMethod::Dinheiro)
            .await
            .unwrap();
        assert_eq!(paid.status, InstallmentStatus::Paid);
        assert_eq!(paid.paid_method, Some(PaymentMethod::Dinheiro));

        // Cancel the bill: all 3 installments become cancelled, #1 included.
        office
            .billing
            .cancel_bill(&admin, created.bill.id)
            .await
            .unwrap();
        let installments = office
            .billing
            .bill_installments(&admin, created.bill.id)
            .await
            .unwrap();
        assert_eq!(installments.len(), 3);
        for installment in &installments {
            assert_eq!(installment.status, InstallmentStatus::Cancelled);
        }
        // The paid snapshot survives the cascade.
        assert!(installments[0].paid_at.is_some());

        // Paying installment #2 now fails as a business-rule violation.
        let err = office
            .billing
            .pay_installment(&admin, created.installments[1].id, PaymentMethod::Pix)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn paying_twice_fails_without_side_effects() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();
        let id = created.installments[0].id;

        office
            .billing
            .pay_installment(&admin, id, PaymentMethod::Dinheiro)
            .await
            .unwrap();
        let audit_after_first = office.audit.len();

        let err = office
            .billing
            .pay_installment(&admin, id, PaymentMethod::Pix)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));

        // No extra audit entry, method unchanged.
        assert_eq!(office.audit.len(), audit_after_first);
        let installment = office
            .billing
            .bill_installments(&admin, created.bill.id)
            .await
            .unwrap()
            .remove(0);
        assert_eq!(installment.paid_method, Some(PaymentMethod::Dinheiro));
    }

    #[tokio::test]
    async fn cancelling_a_cancelled_bill_fails() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();

        office
            .billing
            .cancel_bill(&admin, created.bill.id)
            .await
            .unwrap();
        let err = office
            .billing
            .cancel_bill(&admin, created.bill.id)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn pay_all_pays_every_pending_and_sums() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();

        // One already paid; pay-all settles the remaining two.
        office
            .billing
            .pay_installment(&admin, created.installments[0].id, PaymentMethod::Dinheiro)
            .await
            .unwrap();

        let outcome = office
            .billing
            .pay_all_installments(&admin, created.bill.id, PaymentMethod::Pix)
            .await
            .unwrap();
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.total.amount(), dec!(200.00));

        // Nothing pending anymore.
        let err = office
            .billing
            .pay_all_installments(&admin, created.bill.id, PaymentMethod::Pix)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn payment_reversal_restores_pending() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let created = office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();
        let id = created.installments[0].id;

        office
            .billing
            .pay_installment(&admin, id, PaymentMethod::Cartao)
            .await
            .unwrap();
        let reverted = office
            .billing
            .cancel_installment_payment(&admin, id)
            .await
            .unwrap();

        assert_eq!(reverted.status, InstallmentStatus::Pending);
        assert!(reverted.paid_at.is_none());
        assert!(reverted.paid_method.is_none());

        // Reverting a pending installment is a business-rule violation.
        let err = office
            .billing
            .cancel_installment_payment(&admin, id)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn pending_query_enriches_with_client_context() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        office
            .billing
            .create_bill(&admin, BillBuilder::for_client(client_id).build())
            .await
            .unwrap();

        let rows = office
            .billing
            .pending_installments(&admin, &PendingFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].client_name, "JOÃO DA SILVA");

        let filtered = office
            .billing
            .pending_installments(
                &admin,
                &PendingFilter {
                    client_name: Some("joão".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(filtered.len(), 3);

        let none = office
            .billing
            .pending_installments(
                &admin,
                &PendingFilter {
                    client_name: Some("maria".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}

mod allocation {
    use super::*;

    /// Two pending installments, D1 < D2: the first allocation settles D1,
    /// the second settles D2, and the transactions carry the installments'
    /// amounts.
    #[tokio::test]
    async fn allocation_is_oldest_first_and_deterministic() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let product_id = seed_product(&office).await;

        let created = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .installments(2)
                    .build(),
            )
            .await
            .unwrap();

        let first = office
            .ledger
            .allocate_client_payment(&admin, client_id, product_id, PaymentMethod::Dinheiro)
            .await
            .unwrap();
        assert_eq!(first.installment.id, created.installments[0].id);
        assert_eq!(first.installment.number, 1);
        assert_eq!(first.transaction.amount, first.installment.amount);
        assert_eq!(first.transaction.kind, TransactionKind::PagamentoCliente);
        assert_eq!(first.transaction.installment_id, Some(first.installment.id));

        let second = office
            .ledger
            .allocate_client_payment(&admin, client_id, product_id, PaymentMethod::Pix)
            .await
            .unwrap();
        assert_eq!(second.installment.number, 2);

        // Third call: nothing left to settle.
        let err = office
            .ledger
            .allocate_client_payment(&admin, client_id, product_id, PaymentMethod::Pix)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn allocation_is_scoped_to_the_given_product() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let product_id = seed_product(&office).await;
        let other_product = office
            .products
            .create_product(
                &admin,
                ProductBuilder::new().code("OUTRO").name("OUTRO PLANO").build(),
            )
            .await
            .unwrap()
            .id;

        office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .installments(1)
                    .build(),
            )
            .await
            .unwrap();

        // The client owes nothing on the other product.
        let err = office
            .ledger
            .allocate_client_payment(&admin, client_id, other_product, PaymentMethod::Dinheiro)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn allocation_skips_cancelled_bills() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let product_id = seed_product(&office).await;

        let created = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .installments(1)
                    .build(),
            )
            .await
            .unwrap();
        office
            .billing
            .cancel_bill(&admin, created.bill.id)
            .await
            .unwrap();

        let err = office
            .ledger
            .allocate_client_payment(&admin, client_id, product_id, PaymentMethod::Dinheiro)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    /// Reversal symmetry: cancelling the client-payment transaction puts
    /// the installment back to pending with cleared payment metadata.
    #[tokio::test]
    async fn cancelling_a_client_payment_reverts_the_installment() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await;
        let product_id = seed_product(&office).await;

        office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .installments(1)
                    .build(),
            )
            .await
            .unwrap();

        let allocation = office
            .ledger
            .allocate_client_payment(&admin, client_id, product_id, PaymentMethod::Dinheiro)
            .await
            .unwrap();

        office
            .ledger
            .cancel_transaction(&admin, allocation.transaction.id)
            .await
            .unwrap();

        let rows = office
            .billing
            .pending_installments(&admin, &PendingFilter::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].installment.id, allocation.installment.id);
        assert!(rows[0].installment.paid_at.is_none());
        assert!(rows[0].installment.paid_method.is_none());
    }
}

mod ledger {
    use super::*;

    #[tokio::test]
    async fn expense_with_card_is_rejected_cash_accepted() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::saida(Money::brl(dec!(50.00)))
                    .method(PaymentMethod::Cartao)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));

        let ok = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::saida(Money::brl(dec!(50.00)))
                    .method(PaymentMethod::Dinheiro)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(ok.kind, TransactionKind::Saida);
    }

    #[tokio::test]
    async fn income_accepts_deferred_methods() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let ok = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(80.00)))
                    .method(PaymentMethod::Boleto)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(ok.method, PaymentMethod::Boleto);
    }

    #[tokio::test]
    async fn direct_client_payment_kind_is_rejected() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let err = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(10.00)))
                    .kind(TransactionKind::PagamentoCliente)
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[tokio::test]
    async fn cancelling_twice_is_a_business_rule_violation() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        let transaction = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(10.00))).build(),
            )
            .await
            .unwrap();

        office
            .ledger
            .cancel_transaction(&admin, transaction.id)
            .await
            .unwrap();
        let err = office
            .ledger
            .cancel_transaction(&admin, transaction.id)
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn summary_reflects_entradas_saidas_and_cancellations() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(100.00))).build(),
            )
            .await
            .unwrap();
        office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::saida(Money::brl(dec!(40.00))).build(),
            )
            .await
            .unwrap();
        let cancelled = office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(500.00))).build(),
            )
            .await
            .unwrap();
        office
            .ledger
            .cancel_transaction(&admin, cancelled.id)
            .await
            .unwrap();

        let summary = office
            .ledger
            .summary(&admin, &TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(summary.total_entrada.amount(), dec!(100.00));
        assert_eq!(summary.total_saida.amount(), dec!(40.00));
        assert_eq!(summary.saldo.amount(), dec!(60.00));
        assert_eq!(summary.count, 2);
    }

    #[tokio::test]
    async fn report_export_renders_through_the_port() {
        let office = TestBackOffice::new();
        let admin = admin_actor();

        office
            .ledger
            .record_transaction(
                &admin,
                TransactionBuilder::entrada(Money::brl(dec!(10.00))).build(),
            )
            .await
            .unwrap();

        let (document, content_type) = office
            .ledger
            .export_report(&admin, &TransactionFilter::default())
            .await
            .unwrap();
        assert_eq!(content_type, "text/plain");
        assert!(!document.is_empty());
    }
}

mod authorization_paths {
    use super::*;

    #[tokio::test]
    async fn reception_needs_the_bills_grant() {
        let office = TestBackOffice::new();
        let client_id = seed_client(&office).await;

        let without = reception_actor();
        let err = office
            .billing
            .create_bill(&without, BillBuilder::for_client(client_id).build())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::Denied(_)));

        let with = reception_actor_with(Capability::Bills);
        assert!(office
            .billing
            .create_bill(&with, BillBuilder::for_client(client_id).build())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn denied_operations_leave_no_audit_trail() {
        let office = TestBackOffice::new();
        let client_id = seed_client(&office).await;
        let audit_before = office.audit.len();

        let reception = reception_actor();
        let _ = office
            .billing
            .create_bill(&reception, BillBuilder::for_client(client_id).build())
            .await;

        assert_eq!(office.audit.len(), audit_before);
    }
}

mod audit_completeness {
    use super::*;

    /// Every successful mutating operation appends exactly one entry;
    /// failures append none.
    #[tokio::test]
    async fn one_entry_per_successful_mutation() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let client_id = seed_client(&office).await; // +1 (client_created)
        let product_id = seed_product(&office).await; // +1 (product_created)
        assert_eq!(office.audit.len(), 2);

        let created = office
            .billing
            .create_bill(
                &admin,
                BillBuilder::for_client(client_id)
                    .product(product_id)
                    .installments(2)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(office.audit.len(), 3);

        office
            .billing
            .pay_installment(&admin, created.installments[0].id, PaymentMethod::Dinheiro)
            .await
            .unwrap();
        assert_eq!(office.audit.len(), 4);

        // A failing operation adds nothing.
        let _ = office
            .billing
            .pay_installment(&admin, created.installments[0].id, PaymentMethod::Dinheiro)
            .await
            .unwrap_err();
        assert_eq!(office.audit.len(), 4);

        office
            .billing
            .cancel_bill(&admin, created.bill.id)
            .await
            .unwrap();
        assert_eq!(office.audit.len(), 5);
    }
}

mod sales {
    use super::*;
    use test_utils::{sales_actor, SaleBuilder};

    #[tokio::test]
    async fn sale_snapshots_price_and_draws_stock() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let product = office
            .products
            .create_product(
                &admin,
                ProductBuilder::new()
                    .code("CBL")
                    .name("CABO DE REDE")
                    .price(Money::brl(dec!(25.50)))
                    .stock(5)
                    .build(),
            )
            .await
            .unwrap();

        let seller = sales_actor();
        let sale = office
            .sales
            .record_sale(&seller, SaleBuilder::of(product.id).quantity(2).build())
            .await
            .unwrap();

        assert_eq!(sale.total.amount(), dec!(51.00));
        assert_eq!(sale.seller_id, seller.id);

        let left = office.products_store.stock_of(product.id);
        assert_eq!(left, Some(Some(3)));
    }

    #[tokio::test]
    async fn sale_fails_when_stock_is_short() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let product = office
            .products
            .create_product(
                &admin,
                ProductBuilder::new().code("CBL").name("CABO").stock(1).build(),
            )
            .await
            .unwrap();

        let seller = sales_actor();
        let err = office
            .sales
            .record_sale(&seller, SaleBuilder::of(product.id).quantity(2).build())
            .await
            .unwrap_err();
        assert!(matches!(err, BillingError::BusinessRule(_)));
    }

    #[tokio::test]
    async fn my_reports_shows_only_own_sales() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        let product = office
            .products
            .create_product(&admin, ProductBuilder::new().build())
            .await
            .unwrap();

        let veronica = sales_actor();
        let other = sales_actor();

        office
            .sales
            .record_sale(&veronica, SaleBuilder::of(product.id).build())
            .await
            .unwrap();
        office
            .sales
            .record_sale(&other, SaleBuilder::of(product.id).build())
            .await
            .unwrap();

        let report = office.sales.my_reports(&veronica).await.unwrap();
        assert_eq!(report.count, 1);
        assert!(report.sales.iter().all(|s| s.seller_id == veronica.id));
    }
}

mod registry_interplay {
    use super::*;

    #[tokio::test]
    async fn second_client_with_same_cpf_is_rejected() {
        let office = TestBackOffice::new();
        let admin = admin_actor();
        seed_client(&office).await;

        let err = office
            .clients
            .create_client(
                &admin,
                ClientBuilder::new()
                    .email("outro@email.com")
                    .build(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, domain_registry::RegistryError::Conflict(_)));

        // A different CPF goes through.
        assert!(office
            .clients
            .create_client(
                &admin,
                ClientBuilder::new()
                    .email("outro@email.com")
                    .cpf(VALID_CPF_2)
                    .build(),
            )
            .await
            .is_ok());
    }
}
