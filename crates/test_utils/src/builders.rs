//! Test data builders
//!
//! Builders with sensible defaults so tests name only the fields they care
//! about.

use core_kernel::{Money, ProductId, UserId};
use domain_billing::{NewBill, NewSale, NewTransaction, PaymentMethod, TransactionKind};
use domain_registry::{NewClient, NewProduct};
use rust_decimal_macros::dec;

use crate::fixtures::VALID_CPF;

/// Builder for [`NewProduct`]
pub struct ProductBuilder {
    request: NewProduct,
}

impl ProductBuilder {
    pub fn new() -> Self {
        Self {
            request: NewProduct {
                code: "PLANO_INTERNET".to_string(),
                name: "PLANO DE INTERNET".to_string(),
                price: Money::brl(dec!(100.00)),
                description: None,
                stock: None,
            },
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.request.code = code.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.request.name = name.into();
        self
    }

    pub fn price(mut self, price: Money) -> Self {
        self.request.price = price;
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.request.stock = Some(stock);
        self
    }

    pub fn build(self) -> NewProduct {
        self.request
    }
}

impl Default for ProductBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`NewClient`]
pub struct ClientBuilder {
    request: NewClient,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            request: NewClient {
                name: "JOÃO DA SILVA".to_string(),
                email: "joao@email.com".to_string(),
                cpf: VALID_CPF.to_string(),
                phone: Some("11999999999".to_string()),
                address: Some("RUA DAS FLORES, 123".to_string()),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.request.name = name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.request.email = email.into();
        self
    }

    pub fn cpf(mut self, cpf: impl Into<String>) -> Self {
        self.request.cpf = cpf.into();
        self
    }

    pub fn build(self) -> NewClient {
        self.request
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`NewBill`]
pub struct BillBuilder {
    request: NewBill,
}

impl BillBuilder {
    pub fn for_client(client_id: core_kernel::ClientId) -> Self {
        Self {
            request: NewBill {
                client_id,
                product_id: None,
                description: "COBRANÇA MENSAL".to_string(),
                total_amount: Some(Money::brl(dec!(300.00))),
                installments: 3,
            },
        }
    }

    pub fn product(mut self, product_id: ProductId) -> Self {
        self.request.product_id = Some(product_id);
        self
    }

    pub fn total(mut self, total: Option<Money>) -> Self {
        self.request.total_amount = total;
        self
    }

    pub fn installments(mut self, count: u32) -> Self {
        self.request.installments = count;
        self
    }

    pub fn build(self) -> NewBill {
        self.request
    }
}

/// Builder for [`NewTransaction`]
pub struct TransactionBuilder {
    request: NewTransaction,
}

impl TransactionBuilder {
    pub fn entrada(amount: Money) -> Self {
        Self {
            request: NewTransaction {
                kind: TransactionKind::Entrada,
                amount,
                description: "VENDA BALCÃO".to_string(),
                method: PaymentMethod::Dinheiro,
                product_id: None,
                client_id: None,
            },
        }
    }

    pub fn saida(amount: Money) -> Self {
        Self {
            request: NewTransaction {
                kind: TransactionKind::Saida,
                amount,
                description: "COMPRA DE MATERIAL".to_string(),
                method: PaymentMethod::Dinheiro,
                product_id: None,
                client_id: None,
            },
        }
    }

    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.request.method = method;
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.request.kind = kind;
        self
    }

    pub fn build(self) -> NewTransaction {
        self.request
    }
}

/// Builder for [`NewSale`]
pub struct SaleBuilder {
    request: NewSale,
}

impl SaleBuilder {
    pub fn of(product_id: ProductId) -> Self {
        Self {
            request: NewSale {
                product_id,
                client_id: None,
                quantity: 1,
                method: PaymentMethod::Dinheiro,
            },
        }
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.request.quantity = quantity;
        self
    }

    pub fn build(self) -> NewSale {
        self.request
    }
}

/// Shorthand for a seeded user id
pub fn user_id() -> UserId {
    UserId::new()
}
