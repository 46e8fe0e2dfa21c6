//! Criterion benchmarks for card formatting and ticket search.
//!
//! Run with: `cargo bench`
//!
//! Synthetic tickets keep results reproducible across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ticket_search::{card_pair, format_card, parse_timestamp, SearchScope, TicketIndex, TicketRecord,
    STATUS_CLOSED, STATUS_OPEN};

// ─── Helpers ─────────────────────────────────────────────────────────

const WORDS: &[&str] = &[
    "vpn", "printer", "laptop", "password", "reset", "access", "monitor", "license",
    "outlook", "badge", "wifi", "docking", "station", "request", "broken", "install",
];

fn build_synthetic_tickets(n: usize) -> Vec<TicketRecord> {
    (0..n)
        .map(|i| {
            let title = format!(
                "{} {} {}",
                WORDS[i % WORDS.len()],
                WORDS[(i / 3) % WORDS.len()],
                WORDS[(i / 7) % WORDS.len()]
            );
            TicketRecord {
                title: if i % 50 == 0 { None } else { Some(title) },
                assigned_to_name: format!("agent{}", i % 25),
                status: if i % 3 == 0 { STATUS_CLOSED } else { STATUS_OPEN },
                date_created: parse_timestamp(&format!("2023-{:02}-{:02}", i % 12 + 1, i % 28 + 1)),
            }
        })
        .collect()
}

// ─── Benchmarks ──────────────────────────────────────────────────────

fn bench_format_card(c: &mut Criterion) {
    let record = TicketRecord {
        title: Some("VPN access request for contractor laptop".to_string()),
        assigned_to_name: "Jane".to_string(),
        status: STATUS_OPEN,
        date_created: parse_timestamp("2023-01-01"),
    };

    let mut group = c.benchmark_group("format_card");
    group.bench_function("preview", |b| b.iter(|| format_card(black_box(&record), true)));
    group.bench_function("detail", |b| b.iter(|| format_card(black_box(&record), false)));
    group.bench_function("card_pair", |b| b.iter(|| card_pair(black_box(&record))));
    group.finish();
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for size in [1_000usize, 10_000] {
        let tickets = build_synthetic_tickets(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &tickets, |b, tickets| {
            b.iter(|| TicketIndex::new(black_box(tickets.clone())))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let index = TicketIndex::new(build_synthetic_tickets(10_000))
        .with_assignee(Some("agent7".to_string()));

    let mut group = c.benchmark_group("search_tickets");
    for (label, scope, query) in [
        ("recent_wildcard", SearchScope::RecentTickets, "*"),
        ("open_prefix", SearchScope::OpenTickets, "pr*"),
        ("assigned_two_terms", SearchScope::AssignedTickets, "vpn acc*"),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| index.search_tickets(scope, black_box(query), Some(25), Some(0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_format_card, bench_index_build, bench_search);
criterion_main!(benches);
