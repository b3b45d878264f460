use criterion::{criterion_group, criterion_main, Criterion};
use fseroute_lib::{find_routes, rank_city_pairs, CityPair, JobSource, Result, SearchParams};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::hint::black_box;

const AIRPORTS: usize = 60;

/// Dense synthetic network: every airport offers legs to a spread of others.
struct SyntheticNetwork {
    legs: HashMap<String, Vec<CityPair>>,
}

impl SyntheticNetwork {
    fn build() -> Self {
        let name = |i: usize| format!("X{i:03}");
        let mut legs: HashMap<String, Vec<CityPair>> = HashMap::new();
        for from in 0..AIRPORTS {
            for offset in 1..=19 {
                let to = (from * 7 + offset * 3) % AIRPORTS;
                if to == from {
                    continue;
                }
                let distance = ((from + to) % 40 + 20) as u32 * 5;
                let mut cp = CityPair::new(name(from), name(to), distance);
                let pax = ((from + offset) % 8 + 1) as u64;
                cp.record_pax(pax, ((from * 31 + to * 17) % 400 + 50) as i64 * 10);
                if offset % 3 == 0 {
                    cp.record_cargo(250, ((to * 13) % 90 + 10) as i64 * 20);
                }
                legs.entry(name(from)).or_default().push(cp);
            }
        }
        Self { legs }
    }
}

impl JobSource for SyntheticNetwork {
    fn fetch(&self, airport: &str, limit: usize) -> Result<Vec<CityPair>> {
        let legs = self.legs.get(airport).cloned().unwrap_or_default();
        Ok(rank_city_pairs(legs, limit))
    }
}

static NETWORK: Lazy<SyntheticNetwork> = Lazy::new(SyntheticNetwork::build);

fn benchmark_search(c: &mut Criterion) {
    let network = &*NETWORK;

    c.bench_function("beam_default_4_legs", |b| {
        let params = SearchParams {
            steps: 4,
            ..SearchParams::default()
        };
        b.iter(|| {
            let report = find_routes(network, "X000", params).expect("search runs");
            black_box(report.routes.len())
        });
    });

    c.bench_function("beam_wide_8_legs", |b| {
        let params = SearchParams {
            branching: 20,
            beam_width: 25,
            steps: 8,
            allow_reverse: false,
        };
        b.iter(|| {
            let report = find_routes(network, "X000", params).expect("search runs");
            black_box(report.queries)
        });
    });

    c.bench_function("beam_out_and_back_6_legs", |b| {
        let params = SearchParams {
            steps: 6,
            allow_reverse: true,
            ..SearchParams::default()
        };
        b.iter(|| {
            let report = find_routes(network, "X000", params).expect("search runs");
            black_box(report.steps_completed)
        });
    });
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
