use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::wire::{local_datetime_opt, null_as_default};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(BookingStatus::Pending),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "IN_PROGRESS" => Some(BookingStatus::InProgress),
            "COMPLETED" => Some(BookingStatus::Completed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    Service,
    Combo,
    Equipment,
}

/// One line of a booking. Service lines carry their own stay window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, rename = "type", alias = "itemType")]
    pub kind: Option<ItemKind>,
    #[serde(default)]
    pub service_id: Option<i64>,
    #[serde(default)]
    pub combo_id: Option<i64>,
    #[serde(default)]
    pub equipment_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, with = "local_datetime_opt")]
    pub check_in_date: Option<NaiveDateTime>,
    #[serde(default, with = "local_datetime_opt")]
    pub check_out_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub number_of_people: Option<i32>,
    #[serde(default)]
    pub location: Option<String>,
}

impl BookingItem {
    pub fn line_total(&self) -> f64 {
        self.price.unwrap_or(0.0) * f64::from(self.quantity.unwrap_or(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, with = "local_datetime_opt")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    #[serde(alias = "status")]
    pub label: String,
    #[serde(default, alias = "date", with = "local_datetime_opt")]
    pub at: Option<NaiveDateTime>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default, with = "local_datetime_opt")]
    pub booking_date: Option<NaiveDateTime>,
    #[serde(default, alias = "tripDate", with = "local_datetime_opt")]
    pub check_in_date: Option<NaiveDateTime>,
    #[serde(default, with = "local_datetime_opt")]
    pub check_out_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    pub status: BookingStatus,
    #[serde(default, deserialize_with = "service_lines")]
    pub services: Vec<BookingItem>,
    #[serde(default, deserialize_with = "equipment_lines")]
    pub equipments: Vec<BookingItem>,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default, alias = "note")]
    pub special_request: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeline: Vec<TimelineEvent>,
    #[serde(default, alias = "staffId")]
    pub assigned_staff_id: Option<i64>,
}

/// Untyped lines in `services[]` are services, or combos when they carry a
/// combo id.
fn service_lines<'de, D>(deserializer: D) -> Result<Vec<BookingItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut items: Vec<BookingItem> = null_as_default(deserializer)?;
    for item in items.iter_mut().filter(|i| i.kind.is_none()) {
        item.kind = Some(if item.combo_id.is_some() {
            ItemKind::Combo
        } else {
            ItemKind::Service
        });
    }
    Ok(items)
}

fn equipment_lines<'de, D>(deserializer: D) -> Result<Vec<BookingItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut items: Vec<BookingItem> = null_as_default(deserializer)?;
    for item in items.iter_mut().filter(|i| i.kind.is_none()) {
        item.kind = Some(ItemKind::Equipment);
    }
    Ok(items)
}

impl Booking {
    pub fn first_service(&self) -> Option<&BookingItem> {
        self.services.first()
    }

    pub fn items(&self) -> impl Iterator<Item = &BookingItem> {
        self.services.iter().chain(self.equipments.iter())
    }

    pub fn head_count(&self) -> i32 {
        self.services
            .iter()
            .filter_map(|s| s.number_of_people)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phoneNumber")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "image")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_names() {
        for status in BookingStatus::ALL {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("in_progress"), Some(BookingStatus::InProgress));
        assert_eq!(BookingStatus::parse("archived"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(BookingStatus::Completed.is_terminal());
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(!BookingStatus::Pending.is_terminal());
        assert!(!BookingStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_decode_full_booking() {
        let json = r#"{
            "id": 42,
            "customerId": 7,
            "bookingDate": "2025-05-20T09:15:00",
            "checkInDate": null,
            "totalAmount": 1500000,
            "status": "CONFIRMED",
            "services": [
                {"type": "SERVICE", "serviceId": 3, "name": "Lakeside tent",
                 "checkInDate": "2025-06-01T14:00:00", "checkOutDate": "2025-06-03T12:00:00",
                 "numberOfPeople": 4, "price": 500000, "quantity": 2}
            ],
            "equipments": null,
            "payment": {"method": "VNPAY", "status": "PAID", "createdAt": "2025-05-20T09:20:00"},
            "note": "Near the water please",
            "internalNotes": "VIP"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.id, 42);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.check_in_date, None);
        assert!(booking.equipments.is_empty());
        assert_eq!(booking.services.len(), 1);
        assert_eq!(booking.services[0].kind, Some(ItemKind::Service));
        assert_eq!(booking.services[0].line_total(), 1_000_000.0);
        assert_eq!(booking.head_count(), 4);
        assert_eq!(booking.special_request.as_deref(), Some("Near the water please"));
        assert_eq!(
            booking.payment.as_ref().and_then(|p| p.method.as_deref()),
            Some("VNPAY")
        );
    }

    #[test]
    fn test_decode_rejects_unknown_status() {
        let json = r#"{"id": 1, "status": "ARCHIVED"}"#;
        assert!(serde_json::from_str::<Booking>(json).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_date() {
        let json = r#"{"id": 1, "status": "PENDING", "checkInDate": "soon"}"#;
        assert!(serde_json::from_str::<Booking>(json).is_err());
    }

    #[test]
    fn test_untyped_lines_take_kind_from_their_array() {
        let json = r#"{
            "id": 5,
            "status": "PENDING",
            "services": [
                {"serviceId": 3, "name": "Lều ven hồ"},
                {"comboId": 9, "name": "Combo cuối tuần"},
                {"type": "COMBO", "serviceId": 4}
            ],
            "equipments": [
                {"equipmentId": 11, "name": "Bếp gas", "quantity": 2},
                {"itemType": "EQUIPMENT", "equipmentId": 12}
            ]
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        let kinds: Vec<Option<ItemKind>> = booking.items().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                Some(ItemKind::Service),
                Some(ItemKind::Combo),
                Some(ItemKind::Combo),
                Some(ItemKind::Equipment),
                Some(ItemKind::Equipment),
            ]
        );
    }
}
