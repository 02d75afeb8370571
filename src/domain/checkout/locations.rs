//! Province, district and ward choices offered by the checkout form.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub value: &'static str,
    pub label: &'static str,
}

const fn loc(value: &'static str, label: &'static str) -> Location { Location { value, label } }

const CITIES: &[Location] = &[
    loc("hanoi", "Hà Nội"),
    loc("hochiminh", "TP. Hồ Chí Minh"),
    loc("danang", "Đà Nẵng"),
    loc("haiphong", "Hải Phòng"),
    loc("cantho", "Cần Thơ"),
];

const HANOI_DISTRICTS: &[Location] = &[
    loc("hbt", "Hai Bà Trưng"),
    loc("hk", "Hoàn Kiếm"),
    loc("dd", "Đống Đa"),
    loc("tx", "Thanh Xuân"),
];

const HCM_DISTRICTS: &[Location] = &[
    loc("q1", "Quận 1"),
    loc("q3", "Quận 3"),
    loc("q7", "Quận 7"),
    loc("tb", "Tân Bình"),
];

const HBT_WARDS: &[Location] = &[
    loc("bach_khoa", "Bách Khoa"),
    loc("vinh_tuy", "Vĩnh Tuy"),
    loc("minh_khai", "Minh Khai"),
];

const Q1_WARDS: &[Location] = &[
    loc("ben_nghe", "Bến Nghé"),
    loc("ben_thanh", "Bến Thành"),
    loc("da_kao", "Đa Kao"),
];

pub fn cities() -> &'static [Location] { CITIES }

/// Unknown cities have no district list yet.
pub fn districts(city: &str) -> &'static [Location] {
    match city {
        "hanoi" => HANOI_DISTRICTS,
        "hochiminh" => HCM_DISTRICTS,
        _ => &[],
    }
}

pub fn wards(district: &str) -> &'static [Location] {
    match district {
        "hbt" => HBT_WARDS,
        "q1" => Q1_WARDS,
        _ => &[],
    }
}
