use orderdesk_catalog::StockError;
use orderdesk_core::StoreError;
use uuid::Uuid;

/// Why an order could not be created.
///
/// Everything except `Store` is a validation failure meant for the caller.
/// `Store` covers infrastructure trouble, including stock conflicts that
/// outlived the retry budget.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Invalid customer id")]
    InvalidCustomer(Uuid),

    #[error("You can't buy an invalid product")]
    InvalidProduct { missing: Vec<Uuid> },

    #[error("Sorry, we don't have enough {product_name} in stock. Requested {requested}. Available {available}.")]
    InsufficientStock {
        product_id: Uuid,
        product_name: String,
        requested: u32,
        available: u32,
    },

    #[error("An order needs at least one item")]
    EmptyOrder,

    #[error("Quantity for product {product_id} must be greater than zero")]
    InvalidQuantity { product_id: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

impl From<StockError> for OrderError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::NotFound(id) => Self::InvalidProduct { missing: vec![id] },
            StockError::Insufficient {
                product_id,
                product_name,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                product_name,
                requested,
                available,
            },
        }
    }
}
