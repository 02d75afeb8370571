//! Account forms: sign in, sign up, password reset, profile

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[validate(length(min = 2, message = "Tên phải có ít nhất 2 ký tự"))]
    pub name: String,
    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Mật khẩu không khớp"))]
    pub confirm_password: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email(message = "Email không hợp lệ"))]
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Mật khẩu không khớp"))]
    pub confirm_password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 2, message = "Họ tên phải có ít nhất 2 ký tự"))]
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub ward: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
}
