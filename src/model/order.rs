//! Order records as published by the upstream event producer.

use crate::framework::{Record, TtlCache};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderUid(String);

impl OrderUid {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderUid {
    fn from(uid: &str) -> Self {
        Self(uid.to_string())
    }
}

impl From<String> for OrderUid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl Display for OrderUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    #[serde(default)]
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i32,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i32,
}

/// A customer order.
///
/// Orders are immutable snapshots: any change replaces the whole record, both in the store
/// and in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_uid: OrderUid,
    pub track_number: String,
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<Item>,
    pub locale: String,
    #[serde(default)]
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i32,
    pub date_created: DateTime<Utc>,
    pub oof_shard: String,
}

/// The cache instantiation used throughout the service.
pub type OrderCache = TtlCache<Order>;

impl Record for Order {
    type Id = OrderUid;

    fn id(&self) -> &OrderUid {
        &self.order_uid
    }
}

/// Reasons an order event is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid email: {0:?}")]
    InvalidEmail(String),
    #[error("Order has no items")]
    NoItems,
    #[error("Field {field} must be non-negative, got {value}")]
    Negative { field: String, value: i64 },
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    Ok(())
}

fn require_id(field: &str, value: i64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    Ok(())
}

fn non_negative(field: &str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

impl Order {
    /// Checks the event contract: required strings present, a plausible e-mail, at least one
    /// item, and no negative money or count fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("order_uid", self.order_uid.as_str())?;
        require("track_number", &self.track_number)?;
        require("entry", &self.entry)?;
        require("locale", &self.locale)?;
        require("customer_id", &self.customer_id)?;
        require("delivery_service", &self.delivery_service)?;
        require("shardkey", &self.shardkey)?;
        require("oof_shard", &self.oof_shard)?;
        non_negative("sm_id", self.sm_id.into())?;

        let d = &self.delivery;
        require("delivery.name", &d.name)?;
        require("delivery.phone", &d.phone)?;
        require("delivery.zip", &d.zip)?;
        require("delivery.city", &d.city)?;
        require("delivery.address", &d.address)?;
        require("delivery.region", &d.region)?;
        require("delivery.email", &d.email)?;
        if !is_plausible_email(&d.email) {
            return Err(ValidationError::InvalidEmail(d.email.clone()));
        }

        let p = &self.payment;
        require("payment.transaction", &p.transaction)?;
        require("payment.currency", &p.currency)?;
        require("payment.provider", &p.provider)?;
        require("payment.bank", &p.bank)?;
        non_negative("payment.amount", p.amount)?;
        non_negative("payment.payment_dt", p.payment_dt)?;
        non_negative("payment.delivery_cost", p.delivery_cost)?;
        non_negative("payment.goods_total", p.goods_total)?;
        non_negative("payment.custom_fee", p.custom_fee)?;

        if self.items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        for (i, item) in self.items.iter().enumerate() {
            let field = |name: &str| format!("items[{}].{}", i, name);
            require_id(&field("chrt_id"), item.chrt_id)?;
            require(&field("track_number"), &item.track_number)?;
            require(&field("rid"), &item.rid)?;
            require(&field("name"), &item.name)?;
            require(&field("size"), &item.size)?;
            require_id(&field("nm_id"), item.nm_id)?;
            require(&field("brand"), &item.brand)?;
            non_negative(&field("price"), item.price)?;
            non_negative(&field("sale"), item.sale.into())?;
            non_negative(&field("total_price"), item.total_price)?;
            non_negative(&field("status"), item.status.into())?;
        }

        Ok(())
    }

    /// Builds a valid order shaped like the producer's output.
    ///
    /// The contents are derived from `uid` alone, so the same uid always yields an equal order.
    pub fn sample(uid: impl Into<OrderUid>) -> Self {
        const CITIES: [&str; 5] = [
            "Moscow",
            "Saint Petersburg",
            "Kazan",
            "Yekaterinburg",
            "Novosibirsk",
        ];
        const NAMES: [&str; 5] = [
            "Ivan Ivanov",
            "Petr Petrov",
            "Anna Sidorova",
            "Maria Kozlova",
            "Alexey Smirnov",
        ];
        const BRANDS: [&str; 5] = ["Nike", "Adidas", "Puma", "Reebok", "New Balance"];
        const SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

        let order_uid: OrderUid = uid.into();
        let seed = fnv1a(order_uid.as_str());
        let pick = |shift: u32, len: usize| ((seed >> shift) as usize) % len;

        let track_number = format!("TRACK{:06}", seed % 1_000_000);
        let city = CITIES[pick(8, CITIES.len())];
        let price = 500 + (seed % 5000) as i64;
        let sale = pick(16, 50) as i32;
        let total_price = price * i64::from(100 - sale) / 100;
        let delivery_cost = 200 + (seed % 500) as i64;
        let date_created = DateTime::<Utc>::from_timestamp(1_705_314_600, 0).unwrap_or_default();

        Self {
            track_number: track_number.clone(),
            entry: "WBIL".to_string(),
            delivery: Delivery {
                name: NAMES[pick(12, NAMES.len())].to_string(),
                phone: format!("+7{:010}", seed % 10_000_000_000),
                zip: (100_000 + seed % 500_000).to_string(),
                city: city.to_string(),
                address: format!("Lenina st. {}", 1 + seed % 100),
                region: format!("{} region", city),
                email: format!("user{}@example.com", seed % 10_000),
            },
            payment: Payment {
                transaction: format!("txn_{}", order_uid),
                request_id: String::new(),
                currency: "RUB".to_string(),
                provider: "alfabank".to_string(),
                amount: total_price + delivery_cost,
                payment_dt: date_created.timestamp(),
                bank: "alfa".to_string(),
                delivery_cost,
                goods_total: total_price,
                custom_fee: 0,
            },
            items: vec![Item {
                chrt_id: 100_000 + (seed % 900_000) as i64,
                track_number,
                price,
                rid: format!("rid_{}", order_uid),
                name: "T-shirt".to_string(),
                sale,
                size: SIZES[pick(20, SIZES.len())].to_string(),
                total_price,
                nm_id: 1_000_000 + (seed % 9_000_000) as i64,
                brand: BRANDS[pick(24, BRANDS.len())].to_string(),
                status: 202,
            }],
            locale: "ru".to_string(),
            internal_signature: String::new(),
            customer_id: format!("customer_{}", seed % 10_000),
            delivery_service: "meest".to_string(),
            shardkey: (seed % 10).to_string(),
            sm_id: pick(28, 100) as i32,
            date_created,
            oof_shard: "1".to_string(),
            order_uid,
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

fn fnv1a(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIRE_ORDER: &str = r#"{
        "order_uid": "b563feb7b2b84b6test",
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": "b563feb7b2b84b6test",
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1637907727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [{
            "chrt_id": 9934930,
            "track_number": "WBILMTESTTRACK",
            "price": 453,
            "rid": "ab4219087a764ae0btest",
            "name": "Mascaras",
            "sale": 30,
            "size": "0",
            "total_price": 317,
            "nm_id": 2389212,
            "brand": "Vivienne Sabo",
            "status": 202
        }],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    }"#;

    #[test]
    fn test_parse_wire_order() {
        let order: Order = serde_json::from_str(WIRE_ORDER).unwrap();
        assert_eq!(order.id(), &OrderUid::from("b563feb7b2b84b6test"));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.payment.amount, 1817);
        assert_eq!(order.date_created.timestamp(), 1_637_907_739);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_uid_serializes_as_plain_string() {
        let json = serde_json::to_value(Order::sample("abc")).unwrap();
        assert_eq!(json["order_uid"], "abc");
    }

    #[test]
    fn test_sample_is_deterministic_and_valid() {
        let a = Order::sample("order_1");
        assert_eq!(a, Order::sample("order_1"));
        assert_ne!(a.track_number, Order::sample("order_2").track_number);
        assert_eq!(a.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_missing_field() {
        let mut order = Order::sample("x");
        order.delivery.city = "  ".to_string();
        assert_eq!(
            order.validate(),
            Err(ValidationError::MissingField("delivery.city".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut order = Order::sample("x");
        order.delivery.email = "not-an-email".to_string();
        assert!(matches!(order.validate(), Err(ValidationError::InvalidEmail(_))));
    }

    #[test]
    fn test_validate_rejects_empty_items() {
        let mut order = Order::sample("x");
        order.items.clear();
        assert_eq!(order.validate(), Err(ValidationError::NoItems));
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let mut order = Order::sample("x");
        order.items[0].price = -1;
        assert_eq!(
            order.validate(),
            Err(ValidationError::Negative {
                field: "items[0].price".to_string(),
                value: -1
            })
        );
    }
}
