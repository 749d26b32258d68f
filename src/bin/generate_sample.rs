use chrono::{Duration, NaiveDate};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, low: u64, high: u64) -> u64 {
        low + self.next_u64() % (high - low)
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const REGIONS: &[(&str, &[&str])] = &[
    ("East", &["New York", "Pennsylvania", "Ohio"]),
    ("West", &["California", "Washington", "Colorado"]),
    ("Central", &["Texas", "Illinois", "Michigan"]),
    ("South", &["Florida", "Georgia", "Virginia"]),
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("Technology", &["Phones", "Accessories", "Machines", "Copiers"]),
    ("Furniture", &["Chairs", "Tables", "Bookcases", "Furnishings"]),
    (
        "Office Supplies",
        &["Binders", "Paper", "Storage", "Appliances", "Labels"],
    ),
];

const SEGMENTS: &[&str] = &["Consumer", "Corporate", "Home Office"];

const DISCOUNTS: &[f64] = &[0.0, 0.0, 0.0, 0.1, 0.1, 0.2, 0.3, 0.4];

fn main() {
    let mut rng = SimpleRng::new(42);

    let output_path = "sample_superstore.csv";
    let mut writer = csv::Writer::from_path(output_path).expect("Failed to create output file");

    writer
        .write_record([
            "Order Date",
            "Ship Date",
            "Region",
            "State",
            "Category",
            "Sub-Category",
            "Segment",
            "Product Name",
            "Sales",
            "Profit",
            "Discount",
        ])
        .expect("Failed to write header");

    let mut row_count = 0usize;

    // Three years of orders with a gentle upward trend and a Q4 peak, so the
    // monthly trend and forecast charts have visible structure.
    for month_index in 0..36u32 {
        let year = 2015 + (month_index / 12) as i32;
        let month = month_index % 12 + 1;

        let mut orders = 40 + month_index as usize;
        if month >= 10 {
            orders = orders * 16 / 10;
        }

        for _ in 0..orders {
            let order_date = NaiveDate::from_ymd_opt(year, month, rng.range(1, 29) as u32)
                .expect("valid order date");
            let ship_date = order_date + Duration::days(rng.range(2, 8) as i64);

            let (region, states) = *rng.pick(REGIONS);
            let state = *rng.pick(states);
            let (category, sub_categories) = *rng.pick(CATEGORIES);
            let sub_category = *rng.pick(sub_categories);
            let segment = *rng.pick(SEGMENTS);
            let product_name = format!(
                "{sub_category} Model {}",
                (b'A' + (rng.next_u64() % 6) as u8) as char
            );

            let sales = (rng.gauss(4.5, 1.0).exp() * 100.0).round() / 100.0;
            let discount = *rng.pick(DISCOUNTS);
            let margin = rng.gauss(0.15, 0.12) - 0.5 * discount;
            let profit = (sales * margin * 100.0).round() / 100.0;

            writer
                .write_record([
                    order_date.format("%Y-%m-%d").to_string(),
                    ship_date.format("%Y-%m-%d").to_string(),
                    region.to_string(),
                    state.to_string(),
                    category.to_string(),
                    sub_category.to_string(),
                    segment.to_string(),
                    product_name,
                    format!("{sales:.2}"),
                    format!("{profit:.2}"),
                    format!("{discount:.1}"),
                ])
                .expect("Failed to write row");
            row_count += 1;
        }
    }

    writer.flush().expect("Failed to flush output");

    println!("Wrote {row_count} orders (2015-01 … 2017-12) to {output_path}");
}
