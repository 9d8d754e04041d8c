//! Named parameters for the API methods.
//!
//! Each struct carries the required fields of one method plus its optional
//! attributes. Unset optionals are vacuumed out of the request, so they are
//! absent on the wire and in the signature plaintext.

use serde::Serialize;
use serde_json::{json, Value};
use trustly_lib::{JsonRpcRequest, Result};

use crate::api::api_bool;

/// A signed-channel method call.
pub trait MethodCall {
    /// RPC method name.
    const METHOD: &'static str;

    /// The `Data` mapping without credentials.
    fn data(&self) -> Value;

    /// The `Data.Attributes` mapping, if the method has one.
    fn attributes(&self) -> Option<Value> {
        None
    }

    /// Build the unsigned request.
    fn to_request(&self) -> Result<JsonRpcRequest> {
        JsonRpcRequest::new(Self::METHOD, Some(self.data()), self.attributes())
    }
}

fn hold_notifications(mut attributes: Value, hold: bool) -> Value {
    if hold {
        attributes["HoldNotifications"] = json!(1);
    }
    attributes
}

/// Start a deposit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deposit {
    /// URL the provider posts notifications to
    pub notification_url: String,
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Merchant's unique id for this order
    pub message_id: String,
    /// End user language and region, e.g. `sv_SE`
    pub locale: Option<String>,
    /// Amount with two decimals, e.g. `100.00`
    pub amount: Option<String>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// ISO 3166-1 country of the end user
    pub country: Option<String>,
    /// End user IP address
    pub ip: Option<String>,
    /// Redirect target after a completed flow
    pub success_url: Option<String>,
    /// Redirect target after an aborted flow
    pub fail_url: Option<String>,
    /// Page the provider iframe is embedded in
    pub template_url: Option<String>,
    /// Frame the redirects are opened in
    pub url_target: Option<String>,
    /// End user mobile number
    pub mobile_phone: Option<String>,
    /// End user first name
    pub first_name: Option<String>,
    /// End user last name
    pub last_name: Option<String>,
    /// End user national identification number
    pub national_identification_number: Option<String>,
    /// Text on the end user's bank statement
    pub shopper_statement: Option<String>,
    /// Lower bound suggested to the end user
    pub suggested_min_amount: Option<String>,
    /// Upper bound suggested to the end user
    pub suggested_max_amount: Option<String>,
    /// Name and version of the integrating platform
    pub integration_module: Option<String>,
    /// Ask the provider to hold notifications (test environments)
    pub hold_notifications: bool,
}

impl Deposit {
    /// A deposit with only the required fields set.
    pub fn new(
        notification_url: impl Into<String>,
        end_user_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            notification_url: notification_url.into(),
            end_user_id: end_user_id.into(),
            message_id: message_id.into(),
            ..Self::default()
        }
    }
}

impl MethodCall for Deposit {
    const METHOD: &'static str = "Deposit";

    fn data(&self) -> Value {
        json!({
            "NotificationURL": self.notification_url,
            "EndUserID": self.end_user_id,
            "MessageID": self.message_id,
        })
    }

    fn attributes(&self) -> Option<Value> {
        Some(hold_notifications(
            json!({
                "Locale": self.locale,
                "Amount": self.amount,
                "Currency": self.currency,
                "Country": self.country,
                "IP": self.ip,
                "SuccessURL": self.success_url,
                "FailURL": self.fail_url,
                "TemplateURL": self.template_url,
                "URLTarget": self.url_target,
                "MobilePhone": self.mobile_phone,
                "Firstname": self.first_name,
                "Lastname": self.last_name,
                "NationalIdentificationNumber": self.national_identification_number,
                "ShopperStatement": self.shopper_statement,
                "SuggestedMinAmount": self.suggested_min_amount,
                "SuggestedMaxAmount": self.suggested_max_amount,
                "IntegrationModule": self.integration_module,
            }),
            self.hold_notifications,
        ))
    }
}

/// Start a withdrawal to an account the end user selects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Withdraw {
    /// URL the provider posts notifications to
    pub notification_url: String,
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Merchant's unique id for this order
    pub message_id: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// End user language and region, e.g. `sv_SE`
    pub locale: Option<String>,
    /// ISO 3166-1 country of the end user
    pub country: Option<String>,
    /// End user IP address
    pub ip: Option<String>,
    /// Page the provider iframe is embedded in
    pub template_url: Option<String>,
    /// Clearing house of the bank, e.g. `SWEDEN`
    pub clearing_house: Option<String>,
    /// Bank or clearing number
    pub bank_number: Option<String>,
    /// Account number at the bank
    pub account_number: Option<String>,
    /// End user first name
    pub first_name: Option<String>,
    /// End user last name
    pub last_name: Option<String>,
    /// End user mobile number
    pub mobile_phone: Option<String>,
    /// End user national identification number
    pub national_identification_number: Option<String>,
    /// End user postal address
    pub address: Option<String>,
    /// Ask the provider to hold notifications (test environments)
    pub hold_notifications: bool,
}

impl Withdraw {
    /// A withdrawal with only the required fields set.
    pub fn new(
        notification_url: impl Into<String>,
        end_user_id: impl Into<String>,
        message_id: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            notification_url: notification_url.into(),
            end_user_id: end_user_id.into(),
            message_id: message_id.into(),
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl MethodCall for Withdraw {
    const METHOD: &'static str = "Withdraw";

    fn data(&self) -> Value {
        // The end user picks the amount.
        json!({
            "NotificationURL": self.notification_url,
            "EndUserID": self.end_user_id,
            "MessageID": self.message_id,
            "Currency": self.currency,
            "Amount": null,
        })
    }

    fn attributes(&self) -> Option<Value> {
        Some(hold_notifications(
            json!({
                "Locale": self.locale,
                "Country": self.country,
                "IP": self.ip,
                "TemplateURL": self.template_url,
                "ClearingHouse": self.clearing_house,
                "BankNumber": self.bank_number,
                "AccountNumber": self.account_number,
                "Firstname": self.first_name,
                "Lastname": self.last_name,
                "MobilePhone": self.mobile_phone,
                "NationalIdentificationNumber": self.national_identification_number,
                "Address": self.address,
            }),
            self.hold_notifications,
        ))
    }
}

/// Refund a settled deposit, fully or partially.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Refund {
    /// Provider order id
    pub order_id: String,
    /// Amount with two decimals, e.g. `100.00`
    pub amount: String,
    /// ISO 4217 currency code
    pub currency: String,
}

impl MethodCall for Refund {
    const METHOD: &'static str = "Refund";

    fn data(&self) -> Value {
        json!({
            "OrderID": self.order_id,
            "Amount": self.amount,
            "Currency": self.currency,
        })
    }
}

/// Deny a pending withdrawal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DenyWithdrawal {
    /// Provider order id
    pub order_id: String,
}

impl MethodCall for DenyWithdrawal {
    const METHOD: &'static str = "DenyWithdrawal";

    fn data(&self) -> Value {
        json!({"OrderID": self.order_id})
    }
}

/// Approve a pending withdrawal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproveWithdrawal {
    /// Provider order id
    pub order_id: String,
}

impl MethodCall for ApproveWithdrawal {
    const METHOD: &'static str = "ApproveWithdrawal";

    fn data(&self) -> Value {
        json!({"OrderID": self.order_id})
    }
}

/// Let the end user identify and select a bank account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectAccount {
    /// URL the provider posts notifications to
    pub notification_url: String,
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Merchant's unique id for this order
    pub message_id: String,
    /// End user language and region, e.g. `sv_SE`
    pub locale: Option<String>,
    /// ISO 3166-1 country of the end user
    pub country: Option<String>,
    /// End user IP address
    pub ip: Option<String>,
    /// Redirect target after a completed flow
    pub success_url: Option<String>,
    /// Frame the redirects are opened in
    pub url_target: Option<String>,
    /// End user mobile number
    pub mobile_phone: Option<String>,
    /// End user first name
    pub first_name: Option<String>,
    /// End user last name
    pub last_name: Option<String>,
    /// Ask the provider to hold notifications (test environments)
    pub hold_notifications: bool,
}

impl SelectAccount {
    /// An account selection with only the required fields set.
    pub fn new(
        notification_url: impl Into<String>,
        end_user_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            notification_url: notification_url.into(),
            end_user_id: end_user_id.into(),
            message_id: message_id.into(),
            ..Self::default()
        }
    }
}

impl MethodCall for SelectAccount {
    const METHOD: &'static str = "SelectAccount";

    fn data(&self) -> Value {
        json!({
            "NotificationURL": self.notification_url,
            "EndUserID": self.end_user_id,
            "MessageID": self.message_id,
        })
    }

    fn attributes(&self) -> Option<Value> {
        Some(hold_notifications(
            json!({
                "Locale": self.locale,
                "Country": self.country,
                "IP": self.ip,
                "SuccessURL": self.success_url,
                "URLTarget": self.url_target,
                "MobilePhone": self.mobile_phone,
                "Firstname": self.first_name,
                "Lastname": self.last_name,
            }),
            self.hold_notifications,
        ))
    }
}

/// Register a known bank account for an end user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterAccount {
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Clearing house of the bank, e.g. `SWEDEN`
    pub clearing_house: String,
    /// Bank or clearing number
    pub bank_number: String,
    /// Account number at the bank
    pub account_number: String,
    /// End user first name
    pub first_name: String,
    /// End user last name
    pub last_name: String,
    /// End user mobile number
    pub mobile_phone: Option<String>,
    /// End user national identification number
    pub national_identification_number: Option<String>,
    /// End user postal address
    pub address: Option<String>,
    /// Ask the provider to hold notifications (test environments)
    pub hold_notifications: bool,
}

impl MethodCall for RegisterAccount {
    const METHOD: &'static str = "RegisterAccount";

    fn data(&self) -> Value {
        json!({
            "EndUserID": self.end_user_id,
            "ClearingHouse": self.clearing_house,
            "BankNumber": self.bank_number,
            "AccountNumber": self.account_number,
            "Firstname": self.first_name,
            "Lastname": self.last_name,
        })
    }

    fn attributes(&self) -> Option<Value> {
        Some(hold_notifications(
            json!({
                "MobilePhone": self.mobile_phone,
                "NationalIdentificationNumber": self.national_identification_number,
                "Address": self.address,
            }),
            self.hold_notifications,
        ))
    }
}

/// Pay out to a previously registered account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountPayout {
    /// URL the provider posts notifications to
    pub notification_url: String,
    /// Provider id of a registered account
    pub account_id: String,
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Merchant's unique id for this order
    pub message_id: String,
    /// Amount with two decimals, e.g. `100.00`
    pub amount: String,
    /// ISO 4217 currency code
    pub currency: String,
}

impl MethodCall for AccountPayout {
    const METHOD: &'static str = "AccountPayout";

    fn data(&self) -> Value {
        json!({
            "NotificationURL": self.notification_url,
            "AccountID": self.account_id,
            "EndUserID": self.end_user_id,
            "MessageID": self.message_id,
            "Amount": self.amount,
            "Currency": self.currency,
        })
    }
}

/// Start a person-to-person payment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct P2P {
    /// URL the provider posts notifications to
    pub notification_url: String,
    /// Merchant's identifier of the end user
    pub end_user_id: String,
    /// Merchant's unique id for this order
    pub message_id: String,
    /// Only authorize; capture later with `Capture`
    pub authorize_only: Option<bool>,
    /// Extra data rendered by the template page
    pub template_data: Option<String>,
    /// End user language and region, e.g. `sv_SE`
    pub locale: Option<String>,
    /// Amount with two decimals, e.g. `100.00`
    pub amount: Option<String>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    /// ISO 3166-1 country of the end user
    pub country: Option<String>,
    /// End user IP address
    pub ip: Option<String>,
    /// Redirect target after a completed flow
    pub success_url: Option<String>,
    /// Redirect target after an aborted flow
    pub fail_url: Option<String>,
    /// Page the provider iframe is embedded in
    pub template_url: Option<String>,
    /// Frame the redirects are opened in
    pub url_target: Option<String>,
    /// End user mobile number
    pub mobile_phone: Option<String>,
    /// End user first name
    pub first_name: Option<String>,
    /// End user last name
    pub last_name: Option<String>,
    /// End user national identification number
    pub national_identification_number: Option<String>,
    /// Text on the end user's bank statement
    pub shopper_statement: Option<String>,
    /// Lower bound suggested to the end user
    pub suggested_min_amount: Option<String>,
    /// Upper bound suggested to the end user
    pub suggested_max_amount: Option<String>,
    /// Name and version of the integrating platform
    pub integration_module: Option<String>,
    /// Ask the provider to hold notifications (test environments)
    pub hold_notifications: bool,
}

impl P2P {
    /// A P2P payment with only the required fields set.
    pub fn new(
        notification_url: impl Into<String>,
        end_user_id: impl Into<String>,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            notification_url: notification_url.into(),
            end_user_id: end_user_id.into(),
            message_id: message_id.into(),
            ..Self::default()
        }
    }
}

impl MethodCall for P2P {
    const METHOD: &'static str = "P2P";

    fn data(&self) -> Value {
        json!({
            "NotificationURL": self.notification_url,
            "EndUserID": self.end_user_id,
            "MessageID": self.message_id,
        })
    }

    fn attributes(&self) -> Option<Value> {
        Some(hold_notifications(
            json!({
                "AuthorizeOnly": api_bool(self.authorize_only),
                "TemplateData": self.template_data,
                "Locale": self.locale,
                "Amount": self.amount,
                "Currency": self.currency,
                "Country": self.country,
                "IP": self.ip,
                "SuccessURL": self.success_url,
                "FailURL": self.fail_url,
                "TemplateURL": self.template_url,
                "URLTarget": self.url_target,
                "MobilePhone": self.mobile_phone,
                "Firstname": self.first_name,
                "Lastname": self.last_name,
                "NationalIdentificationNumber": self.national_identification_number,
                "ShopperStatement": self.shopper_statement,
                "SuggestedMinAmount": self.suggested_min_amount,
                "SuggestedMaxAmount": self.suggested_max_amount,
                "IntegrationModule": self.integration_module,
            }),
            self.hold_notifications,
        ))
    }
}

/// Capture an authorized P2P payment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capture {
    /// Provider order id
    pub order_id: String,
    /// Amount with two decimals, e.g. `100.00`
    pub amount: String,
    /// ISO 4217 currency code
    pub currency: String,
}

impl MethodCall for Capture {
    const METHOD: &'static str = "Capture";

    fn data(&self) -> Value {
        json!({
            "OrderID": self.order_id,
            "Amount": self.amount,
            "Currency": self.currency,
        })
    }
}

/// Void an authorized P2P payment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Void {
    /// Provider order id
    pub order_id: String,
}

impl MethodCall for Void {
    const METHOD: &'static str = "Void";

    fn data(&self) -> Value {
        json!({"OrderID": self.order_id})
    }
}

/// Parameters of the legacy `GetViewStable` report call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ViewQuery {
    /// Report view to read
    pub view_name: String,
    /// Order rows by date, `asc` or `desc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_order: Option<String>,
    /// Only rows from this date onwards
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datestamp: Option<String>,
    /// Column filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_keys: Option<Value>,
    /// Maximum number of rows
    pub limit: u32,
    /// Rows to skip
    pub offset: u32,
    /// View specific parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Column to sort by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// `asc` or `desc`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
}

impl ViewQuery {
    /// First page (100 rows) of a view.
    pub fn new(view_name: impl Into<String>) -> Self {
        Self {
            view_name: view_name.into(),
            date_order: None,
            datestamp: None,
            filter_keys: None,
            limit: 100,
            offset: 0,
            params: None,
            sort_by: None,
            sort_order: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_attributes_vanish() {
        let request = Deposit::new("http://notify", "user", "msg").to_request().unwrap();
        assert_eq!(request.method(), Some("Deposit"));
        assert!(request.attributes().is_none());
        assert_eq!(
            request.data(),
            Some(&json!({
                "NotificationURL": "http://notify",
                "EndUserID": "user",
                "MessageID": "msg"
            }))
        );
    }

    #[test]
    fn test_hold_notifications_flag() {
        let mut deposit = Deposit::new("http://notify", "user", "msg");
        deposit.hold_notifications = true;
        let request = deposit.to_request().unwrap();
        assert_eq!(request.attribute("HoldNotifications"), Some(&json!(1)));

        let request = Deposit::new("http://notify", "user", "msg").to_request().unwrap();
        assert!(request.attribute("HoldNotifications").is_none());
    }

    #[test]
    fn test_withdraw_leaves_amount_to_end_user() {
        let request = Withdraw::new("http://notify", "user", "msg", "SEK")
            .to_request()
            .unwrap();
        assert!(request.data_field("Amount").is_none());
        assert_eq!(request.data_field("Currency"), Some(&json!("SEK")));
    }

    #[test]
    fn test_p2p_authorize_only_is_api_bool() {
        let mut p2p = P2P::new("http://notify", "user", "msg");
        p2p.authorize_only = Some(true);
        let request = p2p.to_request().unwrap();
        assert_eq!(request.attribute("AuthorizeOnly"), Some(&json!("1")));

        p2p.authorize_only = Some(false);
        let request = p2p.to_request().unwrap();
        assert_eq!(request.attribute("AuthorizeOnly"), Some(&json!("0")));
    }

    #[test]
    fn test_refund_carries_null_attributes() {
        let request = Refund {
            order_id: "1187741486".into(),
            amount: "10.00".into(),
            currency: "EUR".into(),
        }
        .to_request()
        .unwrap();
        assert_eq!(request.data_field("Attributes"), Some(&Value::Null));
    }

    #[test]
    fn test_capture_and_void_have_no_attributes() {
        let capture = Capture {
            order_id: "1".into(),
            amount: "5.00".into(),
            currency: "SEK".into(),
        }
        .to_request()
        .unwrap();
        assert!(capture.data_field("Attributes").is_none());

        let void = Void { order_id: "1".into() }.to_request().unwrap();
        assert_eq!(void.data(), Some(&json!({"OrderID": "1"})));
    }

    #[test]
    fn test_view_query_serialization() {
        let mut query = ViewQuery::new("Transfers");
        query.sort_by = Some("datestamp".into());
        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(
            value,
            json!({"ViewName": "Transfers", "Limit": 100, "Offset": 0, "SortBy": "datestamp"})
        );
    }
}
