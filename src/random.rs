//! Randomized values used to pre-fill the demo forms.

use rand::seq::SliceRandom;
use rand::Rng;

const VIN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const VIN_LENGTH: usize = 17;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Ivy", "Jack",
];
const LAST_NAMES: &[&str] = &[
    "Zhang", "Wang", "Li", "Zhao", "Liu", "Chen", "Yang", "Huang", "Zhou", "Wu",
];

const CITIES: &[&str] = &["Beijing", "Shanghai", "Guangzhou", "Shenzhen", "Hangzhou", "Chengdu"];
const STREETS: &[&str] = &[
    "Chang'an Ave",
    "Jianguo Rd",
    "Fuxing Rd",
    "Financial St",
    "Wangjing St",
];
const COMMUNITIES: &[&str] = &["Sunshine Court", "Peace Garden", "Lakeside", "Golden Home"];

const BRANDS: &[&str] = &[
    "Tesla", "BYD", "NIO", "XPeng", "Li Auto", "BMW", "Mercedes-Benz", "Audi", "Toyota", "Honda",
];
const MODELS: &[&str] = &[
    "Model 3", "Model Y", "Han", "Tang", "Song", "ET7", "ES6", "P7", "G9", "L9", "3 Series",
    "C-Class", "A4", "Camry", "Accord",
];
const CONDITIONS: &[&str] = &["EXCELLENT", "GOOD", "FAIR", "POOR"];

fn pick(options: &[&'static str]) -> &'static str {
    options.choose(&mut rand::thread_rng()).copied().unwrap_or_default()
}

fn two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn random_name() -> String {
    format!("{} {}", pick(FIRST_NAMES), pick(LAST_NAMES))
}

pub fn random_address() -> String {
    let mut rng = rand::thread_rng();
    let building: u32 = rng.gen_range(1..=20);
    let unit: u32 = rng.gen_range(1..=6);
    let room: u32 = rng.gen_range(101..2101);
    format!(
        "Room {room}, Unit {unit}, Building {building}, {}, {}, {}",
        pick(COMMUNITIES),
        pick(STREETS),
        pick(CITIES)
    )
}

/// Floor area in square metres, 50 to 300.
pub fn random_area() -> f64 {
    two_decimals(rand::thread_rng().gen_range(50.0..300.0))
}

pub fn random_price() -> f64 {
    two_decimals(rand::thread_rng().gen_range(50_000.0..1_000_000.0))
}

pub fn random_brand() -> String {
    pick(BRANDS).to_string()
}

pub fn random_car_model() -> String {
    format!("{} {}", pick(BRANDS), pick(MODELS))
}

pub fn random_year() -> i32 {
    rand::thread_rng().gen_range(2010..=2025)
}

pub fn random_mileage() -> f64 {
    two_decimals(rand::thread_rng().gen_range(0.0..200_000.0))
}

pub fn random_condition() -> String {
    pick(CONDITIONS).to_string()
}

pub fn random_vin() -> String {
    let mut rng = rand::thread_rng();
    (0..VIN_LENGTH)
        .map(|_| char::from(VIN_CHARSET[rng.gen_range(0..VIN_CHARSET.len())]))
        .collect()
}

/// Identifier such as `CAR4821937`.
pub fn random_id(prefix: &str) -> String {
    let n: u32 = rand::thread_rng().gen_range(0..10_000_000);
    format!("{prefix}{n:07}")
}
