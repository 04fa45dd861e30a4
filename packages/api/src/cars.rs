//! Car listings: browsing, submission by riders, admin moderation and rental checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;

use crate::client::{ApiError, SecureClient};
use crate::models::{Principal, ReviewStatus};
use crate::users::WriteResult;

/// One car as returned by `GET /cars` and `GET /cars/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "carName", default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub car_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, deserialize_with = "lenient_fee")]
    pub rental_fee: Option<f64>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub status: ReviewStatus,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub rider_email: Option<String>,
    #[serde(default)]
    pub rider_name: Option<String>,
}

impl Car {
    pub fn owner(&self) -> &str {
        self.rider_name.as_deref().unwrap_or("Owner")
    }

    /// Fee formatted for display, `N/A` when the listing has none.
    pub fn fee_label(&self) -> String {
        match self.rental_fee {
            Some(fee) => format!("{fee} / day"),
            None => "N/A".to_string(),
        }
    }

    /// Case-insensitive match on name, type or location.
    pub fn matches(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        needle.is_empty()
            || [&self.name, &self.car_type, &self.location]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Fee {
    Number(f64),
    Text(String),
}

// Older listings store the fee as a string.
fn lenient_fee<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Fee>::deserialize(deserializer)? {
        Some(Fee::Number(fee)) => Some(fee),
        Some(Fee::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

/// Fields a rider fills in when listing a car.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCar {
    pub car_name: String,
    pub description: String,
    pub car_type: String,
    pub location: String,
    pub rental_fee: f64,
    pub banner_image: String,
}

impl NewCar {
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.rental_fee.is_nan() || self.rental_fee <= 0.0 {
            return Some("Rental fee");
        }
        [
            ("Car name", &self.car_name),
            ("Description", &self.description),
            ("Car type", &self.car_type),
            ("Location", &self.location),
            ("Banner image", &self.banner_image),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
    }
}

/// Body of `POST /cars`: the rider's fields plus ownership and review state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CarSubmission<'a> {
    #[serde(flatten)]
    car: &'a NewCar,
    status: ReviewStatus,
    is_booked: bool,
    rider_email: Option<&'a str>,
    rider_name: Option<&'a str>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct CheckoutSession {
    #[serde(default)]
    url: Option<String>,
}

/// Car endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct CarCatalog {
    client: SecureClient,
}

impl CarCatalog {
    pub fn new(client: SecureClient) -> Self {
        Self { client }
    }

    /// List cars, optionally only those in one review state.
    pub async fn list(&self, status: Option<ReviewStatus>) -> Result<Vec<Car>, ApiError> {
        let path = match status {
            Some(status) => format!("/cars?status={status}"),
            None => "/cars".to_string(),
        };
        let cars: Option<Vec<Car>> = self.client.get_json(&path).await?;
        Ok(cars.unwrap_or_default())
    }

    /// Fetch one car. `None` when the backend has no such listing.
    pub async fn get(&self, id: &str) -> Result<Option<Car>, ApiError> {
        let path = format!("/cars/{}", urlencoding::encode(id));
        match self.client.get_json(&path).await {
            Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => Ok(None),
            other => other,
        }
    }

    /// Submit a listing for admin review on behalf of `owner`.
    pub async fn add(&self, car: &NewCar, owner: &Principal) -> Result<WriteResult, ApiError> {
        if let Some(field) = car.missing_field() {
            return Err(ApiError::InvalidRequest(format!("{field} is required")));
        }
        let now = Utc::now();
        let body = CarSubmission {
            car,
            status: ReviewStatus::Pending,
            is_booked: false,
            rider_email: owner.email.as_deref(),
            rider_name: owner.display_name.as_deref(),
            created_at: now,
            updated_at: now,
        };
        let result: Option<WriteResult> = self.client.post_json("/cars", &body).await?;
        tracing::info!(car = %car.car_name, owner = owner.identifier(), "Car submitted");
        Ok(result.unwrap_or_default())
    }

    /// Approve or reject a pending listing.
    pub async fn set_status(
        &self,
        id: &str,
        status: ReviewStatus,
    ) -> Result<WriteResult, ApiError> {
        if status == ReviewStatus::Pending {
            return Err(ApiError::InvalidRequest(
                "a car can only be approved or rejected".to_string(),
            ));
        }
        let path = format!("/cars/{}/status", urlencoding::encode(id));
        let result: Option<WriteResult> = self
            .client
            .patch_json(&path, &json!({ "status": status }))
            .await?;
        tracing::info!(car = id, %status, "Car reviewed");
        Ok(result.unwrap_or_default())
    }

    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/cars/{}", urlencoding::encode(id));
        self.client.delete(&path).await
    }

    /// Open a checkout session for `car`. Returns the hosted payment page, if any.
    pub async fn start_rental(&self, car: &Car) -> Result<Option<String>, ApiError> {
        let session: Option<CheckoutSession> = self
            .client
            .post_json("/create-rental-session", &json!({ "carId": car.id }))
            .await?;
        Ok(session.and_then(|s| s.url))
    }

    /// Record the payment and the rental after checkout reported success.
    pub async fn finish_rental(&self, car: &Car) -> Result<(), ApiError> {
        let payment = json!({
            "transactionId": format!("STRIPE_{}", Utc::now().timestamp_millis()),
            "amount": car.rental_fee,
            "paymentType": "card",
            "carId": car.id,
        });
        let _: Option<serde_json::Value> = self.client.post_json("/payments", &payment).await?;

        let rental = json!({
            "carId": car.id,
            "carName": car.name,
            "rentalFee": car.rental_fee,
        });
        let _: Option<serde_json::Value> = self.client.post_json("/rentals", &rental).await?;
        tracing::info!(car = %car.id, "Rental recorded");
        Ok(())
    }
}
