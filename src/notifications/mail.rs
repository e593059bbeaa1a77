//! Confirmation mail for the guest who paid.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{ConfirmationNotifier, MailTransport, OutgoingMail};
use crate::domain::{BookingError, BookingResult, RepositoryProvider, Reservation};

pub struct MailNotifier {
    repos: Arc<dyn RepositoryProvider>,
    transport: Arc<dyn MailTransport>,
}

impl MailNotifier {
    pub fn new(repos: Arc<dyn RepositoryProvider>, transport: Arc<dyn MailTransport>) -> Self {
        Self { repos, transport }
    }
}

#[async_trait]
impl ConfirmationNotifier for MailNotifier {
    async fn reservation_confirmed(&self, reservation: &Reservation) -> BookingResult<()> {
        let user = self
            .repos
            .users()
            .find_by_id(&reservation.user_id)
            .await?
            .ok_or_else(|| BookingError::not_found("User", &reservation.user_id))?;
        let hotel_name = self
            .repos
            .hotels()
            .find_by_id(reservation.hotel_id)
            .await?
            .map(|h| h.name)
            .unwrap_or_else(|| "your hotel".to_string());

        let mail = OutgoingMail {
            to: user.email.clone(),
            subject: format!("Your booking at {} is confirmed", hotel_name),
            html_body: render_confirmation(&user.first_name, &hotel_name, reservation),
        };
        self.transport.send(mail).await?;

        info!(
            reservation_id = reservation.id,
            user_id = %reservation.user_id,
            "📧 Booking confirmation sent"
        );
        Ok(())
    }
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            other => other.to_string(),
        })
        .collect()
}

fn render_confirmation(first_name: &str, hotel_name: &str, reservation: &Reservation) -> String {
    format!(
        "<html><body>\
         <p>Hello {first_name},</p>\
         <p>Your stay at <strong>{hotel}</strong> is confirmed.</p>\
         <ul>\
         <li>Check-in: {checkin}</li>\
         <li>Check-out: {checkout}</li>\
         <li>Nights: {nights}</li>\
         <li>Guests: {guests}</li>\
         <li>Total paid: {total}</li>\
         </ul>\
         <p>Reservation #{id}. Reply to this mail if anything needs to change.</p>\
         </body></html>",
        first_name = escape(first_name),
        hotel = escape(hotel_name),
        checkin = reservation.stay.checkin(),
        checkout = reservation.stay.checkout(),
        nights = reservation.stay.nights(),
        guests = reservation.party.guests(),
        total = format_cents(reservation.total_price_cents),
        id = reservation.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Party, ReservationStatus, StayDates};
    use chrono::{NaiveDate, Utc};

    fn reservation() -> Reservation {
        Reservation {
            id: 9,
            hotel_id: 1,
            user_id: "u-1".into(),
            stay: StayDates::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
            )
            .unwrap(),
            party: Party::new(2, 1, false).unwrap(),
            status: ReservationStatus::Paid,
            total_price_cents: 36_050,
            correlation_token: "tok".into(),
            payment_reference: Some("cs_1".into()),
            created_at: Utc::now(),
            paid_at: Some(Utc::now()),
            cancelled_at: None,
        }
    }

    #[test]
    fn body_carries_the_stay_details() {
        let body = render_confirmation("Ada", "Le <Grand>", &reservation());
        assert!(body.contains("Hello Ada,"));
        assert!(body.contains("Le &lt;Grand&gt;"));
        assert!(body.contains("Check-in: 2025-06-01"));
        assert!(body.contains("Check-out: 2025-06-04"));
        assert!(body.contains("Nights: 3"));
        assert!(body.contains("Guests: 3"));
        assert!(body.contains("Total paid: 360.50"));
    }

    #[test]
    fn cents_format() {
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(40_000), "400.00");
        assert_eq!(format_cents(-150), "-1.50");
    }
}
