use rust_decimal::Decimal;
use serde_json::{Map, Value, json};

use stockroom_core::{DataValidationError, Entity, ProductId, ValidationResult};

use crate::category::Category;
use crate::price::{self, PRICE_PRECISION, PRICE_SCALE, PriceInput};

/// Entity: Product.
///
/// A plain value; persistence lives behind the repository in `stockroom-infra`.
/// `id` is `None` until the store assigns one on create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub available: bool,
    pub category: Category,
}

impl Product {
    /// Create a not-yet-persisted product.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        available: bool,
        category: Category,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            price,
            available,
            category,
        }
    }

    /// Check the invariants the store relies on before a write.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.name.trim().is_empty() {
            return Err(DataValidationError::invalid(
                "Invalid product: name must not be empty",
            ));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(DataValidationError::invalid(format!(
                "Invalid product: price {} must not be negative",
                self.price
            )));
        }
        if !price::fits_store_column(self.price) {
            return Err(DataValidationError::invalid(format!(
                "Invalid product: price {} exceeds NUMERIC({PRICE_PRECISION}, {PRICE_SCALE})",
                self.price
            )));
        }
        Ok(())
    }

    /// Serialize into the wire mapping.
    ///
    /// `price` keeps its exact textual form and `category` is its symbolic name.
    pub fn serialize(&self) -> Value {
        json!({
            "id": self.id.map(ProductId::get),
            "name": self.name,
            "description": self.description,
            "price": self.price.to_string(),
            "available": self.available,
            "category": self.category.as_str(),
        })
    }

    /// Overwrite this product's fields from a wire mapping.
    ///
    /// `id` is never read from the mapping; identity belongs to the store.
    /// On error the product is left unchanged.
    pub fn deserialize(&mut self, data: &Value) -> ValidationResult<&mut Self> {
        let map = data.as_object().ok_or_else(|| {
            DataValidationError::invalid(format!(
                "Invalid product: body of request contained bad or no data '{}' value is not subscriptable",
                json_type_name(data)
            ))
        })?;

        let name = string_field(map, "name")?;
        let description = string_field(map, "description")?;
        let price = price_field(map)?;

        let available = match required(map, "available")? {
            Value::Bool(b) => *b,
            other => {
                return Err(DataValidationError::invalid(format!(
                    "Invalid type for boolean [available]: {}",
                    json_type_name(other)
                )));
            }
        };

        let category = match required(map, "category")? {
            Value::String(s) => s.parse::<Category>()?,
            other => {
                return Err(DataValidationError::invalid(format!(
                    "Invalid attribute: {other}"
                )));
            }
        };

        self.name = name;
        self.description = description;
        self.price = price;
        self.available = available;
        self.category = category;
        Ok(self)
    }

    /// Build a fresh, unpersisted product from a wire mapping.
    pub fn from_value(data: &Value) -> ValidationResult<Self> {
        let mut product = Self::default();
        product.deserialize(data)?;
        Ok(product)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Product {} id=[{}]>", self.name, id),
            None => write!(f, "<Product {} id=[None]>", self.name),
        }
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &str) -> ValidationResult<&'a Value> {
    map.get(key)
        .ok_or_else(|| DataValidationError::invalid(format!("Invalid product: missing {key}")))
}

fn string_field(map: &Map<String, Value>, key: &str) -> ValidationResult<String> {
    match required(map, key)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(DataValidationError::invalid(format!(
            "Invalid type for string [{key}]: {}",
            json_type_name(other)
        ))),
    }
}

fn price_field(map: &Map<String, Value>) -> ValidationResult<Decimal> {
    match required(map, "price")? {
        Value::String(s) => PriceInput::from(s.as_str()).to_decimal(),
        Value::Number(n) => price::parse_json_number(&n.to_string()),
        other => Err(DataValidationError::invalid(format!(
            "Invalid type for decimal [price]: {}",
            json_type_name(other)
        ))),
    }
}

/// JSON type name used in validation messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str_exact(s).unwrap()
    }

    fn fedora() -> Product {
        Product::new("Fedora", "A red hat", dec("12.50"), true, Category::Cloths)
    }

    fn err_message(result: ValidationResult<&mut Product>) -> String {
        match result {
            Ok(p) => panic!("expected validation error, got {p}"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn new_product_has_no_identity() {
        let product = fedora();
        assert_eq!(product.to_string(), "<Product Fedora id=[None]>");
        assert_eq!(product.id, None);
        assert!(!product.is_persisted());
        assert_eq!(product.name, "Fedora");
        assert_eq!(product.description, "A red hat");
        assert!(product.available);
        assert_eq!(product.price, dec("12.5"));
        assert_eq!(product.category, Category::Cloths);
    }

    #[test]
    fn display_renders_assigned_id() {
        let mut product = fedora();
        product.id = Some(ProductId::new(7));
        assert_eq!(product.to_string(), "<Product Fedora id=[7]>");
        assert!(product.is_persisted());
    }

    #[test]
    fn default_category_is_unknown() {
        assert_eq!(Product::default().category, Category::Unknown);
    }

    #[test]
    fn serialize_emits_wire_shape() {
        let mut product = fedora();
        product.id = Some(ProductId::new(3));
        let data = product.serialize();
        assert_eq!(
            data,
            json!({
                "id": 3,
                "name": "Fedora",
                "description": "A red hat",
                "price": "12.50",
                "available": true,
                "category": "CLOTHS",
            })
        );
        assert!(fedora().serialize()["id"].is_null());
    }

    #[test]
    fn deserialize_reads_every_field_but_id() {
        let mut product = Product::default();
        product.id = Some(ProductId::new(9));
        product
            .deserialize(&json!({
                "id": 1,
                "name": "Wrench",
                "description": "",
                "price": "4.99",
                "available": false,
                "category": "TOOLS",
            }))
            .unwrap();
        assert_eq!(product.id, Some(ProductId::new(9)));
        assert_eq!(product.name, "Wrench");
        assert_eq!(product.description, "");
        assert_eq!(product.price, dec("4.99"));
        assert!(!product.available);
        assert_eq!(product.category, Category::Tools);
    }

    #[test]
    fn deserialize_accepts_numeric_price() {
        let mut data = fedora().serialize();
        data["price"] = json!(12.5);
        let product = Product::from_value(&data).unwrap();
        assert_eq!(product.price, dec("12.50"));

        data["price"] = json!(30);
        assert_eq!(Product::from_value(&data).unwrap().price, dec("30"));
    }

    #[test]
    fn deserialize_rejects_non_boolean_available() {
        let mut product = fedora();
        let mut data = product.serialize();
        data["available"] = json!("NotBoolean");
        assert_eq!(
            err_message(product.deserialize(&data)),
            "Invalid type for boolean [available]: string"
        );
    }

    #[test]
    fn deserialize_rejects_unknown_category() {
        let mut product = fedora();
        let mut data = product.serialize();
        data["category"] = json!("NON_EXISTENT_CATEGORY");
        assert_eq!(
            err_message(product.deserialize(&data)),
            "Invalid attribute: NON_EXISTENT_CATEGORY"
        );
    }

    #[test]
    fn deserialize_rejects_non_string_category() {
        let mut product = fedora();
        let mut data = product.serialize();
        data["category"] = json!(4);
        assert_eq!(err_message(product.deserialize(&data)), "Invalid attribute: 4");
    }

    #[test]
    fn deserialize_rejects_no_data() {
        let mut product = fedora();
        assert_eq!(
            err_message(product.deserialize(&Value::Null)),
            "Invalid product: body of request contained bad or no data 'null' value is not subscriptable"
        );
        assert_eq!(
            err_message(product.deserialize(&json!([1, 2]))),
            "Invalid product: body of request contained bad or no data 'array' value is not subscriptable"
        );
    }

    #[test]
    fn deserialize_reports_missing_keys() {
        let mut product = fedora();
        for key in ["name", "description", "price", "available", "category"] {
            let mut data = product.serialize();
            data.as_object_mut().unwrap().remove(key);
            assert_eq!(
                err_message(product.deserialize(&data)),
                format!("Invalid product: missing {key}")
            );
        }
    }

    #[test]
    fn deserialize_rejects_bad_price_text() {
        let mut product = fedora();
        let mut data = product.serialize();
        data["price"] = json!("twelve");
        assert_eq!(
            err_message(product.deserialize(&data)),
            "Invalid decimal for [price]: twelve"
        );
    }

    #[test]
    fn deserialize_rejects_non_string_text_fields() {
        let mut product = fedora();
        let mut data = product.serialize();
        data["name"] = json!(42);
        assert_eq!(
            err_message(product.deserialize(&data)),
            "Invalid type for string [name]: number"
        );

        let mut data = product.serialize();
        data["description"] = Value::Null;
        assert_eq!(
            err_message(product.deserialize(&data)),
            "Invalid type for string [description]: null"
        );
    }

    #[test]
    fn deserialize_rejects_price_of_wrong_json_type() {
        let mut product = fedora();
        for (value, type_name) in [(json!(true), "boolean"), (json!([]), "array")] {
            let mut data = product.serialize();
            data["price"] = value;
            assert_eq!(
                err_message(product.deserialize(&data)),
                format!("Invalid type for decimal [price]: {type_name}")
            );
        }
    }

    #[test]
    fn validate_rejects_negative_price() {
        let mut product = fedora();
        product.price = dec("-3.50");
        assert_eq!(
            product.validate().unwrap_err().to_string(),
            "Invalid product: price -3.50 must not be negative"
        );

        product.price = Decimal::ZERO;
        assert!(product.validate().is_ok());
    }

    #[test]
    fn failed_deserialize_leaves_product_unchanged() {
        let mut product = fedora();
        let before = product.clone();
        let mut data = product.serialize();
        data["name"] = json!("Changed");
        data["category"] = json!("NOPE");
        assert!(product.deserialize(&data).is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn validate_rejects_blank_name_and_oversized_price() {
        let mut product = fedora();
        assert!(product.validate().is_ok());

        product.name = "   ".to_string();
        assert_eq!(
            product.validate().unwrap_err().to_string(),
            "Invalid product: name must not be empty"
        );

        product.name = "Fedora".to_string();
        product.price = dec("1.005");
        assert_eq!(
            product.validate().unwrap_err().to_string(),
            "Invalid product: price 1.005 exceeds NUMERIC(14, 2)"
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_category() -> impl Strategy<Value = Category> {
            proptest::sample::select(Category::ALL.to_vec())
        }

        fn arb_product() -> impl Strategy<Value = Product> {
            (
                "[A-Za-z][A-Za-z0-9 ]{0,40}",
                "[A-Za-z0-9 .,]{0,80}",
                0_i64..100_000_000,
                any::<bool>(),
                arb_category(),
            )
                .prop_map(|(name, description, cents, available, category)| {
                    Product::new(name, description, Decimal::new(cents, 2), available, category)
                })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: deserialize(serialize(p)) reproduces every field.
            #[test]
            fn serialize_deserialize_round_trip(product in arb_product()) {
                let restored = Product::from_value(&product.serialize()).unwrap();
                prop_assert_eq!(&restored, &product);
                prop_assert_eq!(restored.price.to_string(), product.price.to_string());
            }

            /// Property: a textual price and its decimal normalize identically.
            #[test]
            fn price_text_matches_decimal(cents in 0_i64..100_000_000) {
                let price = Decimal::new(cents, 2);
                let from_text = PriceInput::from(price.to_string()).to_decimal().unwrap();
                prop_assert_eq!(from_text, price);
            }
        }
    }
}
