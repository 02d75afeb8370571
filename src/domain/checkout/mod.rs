//! Checkout form and its validation rules

pub mod locations;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Thanh toán khi nhận hàng
    #[default]
    Cod,
    Banking,
    Momo,
    Zalopay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cod => "cod",
            Self::Banking => "banking",
            Self::Momo => "momo",
            Self::Zalopay => "zalopay",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Cod => "Thanh toán khi nhận hàng (COD)",
            Self::Banking => "Chuyển khoản ngân hàng",
            Self::Momo => "Ví MoMo",
            Self::Zalopay => "ZaloPay",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    #[validate(length(min = 2, message = "Họ tên phải có ít nhất 2 ký tự"))]
    pub full_name: String,
    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,
    #[validate(length(min = 10, message = "Số điện thoại không hợp lệ"))]
    pub phone: String,
    #[validate(length(min = 5, message = "Địa chỉ phải có ít nhất 5 ký tự"))]
    pub address: String,
    #[validate(length(min = 2, message = "Vui lòng chọn tỉnh/thành phố"))]
    pub city: String,
    #[validate(length(min = 2, message = "Vui lòng chọn quận/huyện"))]
    pub district: String,
    #[validate(length(min = 2, message = "Vui lòng chọn phường/xã"))]
    pub ward: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /api/checkout/:session`: the shipping fields flattened next
/// to the payment method, as the checkout page submits them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(flatten)]
    #[validate]
    pub shipping: ShippingInfo,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[cfg(test)]
impl ShippingInfo {
    pub fn sample() -> Self {
        Self {
            full_name: "Nguyễn Văn A".into(), email: "a.nguyen@example.com".into(),
            phone: "0912345678".into(), address: "12 Phố Huế".into(),
            city: "hanoi".into(), district: "hbt".into(), ward: "bach_khoa".into(), notes: None,
        }
    }
}
