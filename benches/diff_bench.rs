use catalog_diff::{diff_catalogs, Catalog, NameExtractor, PageSnapshot, SiteProfile};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn names(count: usize, prefix: &str) -> Vec<String> {
    (0..count).map(|i| format!("{} App {}", prefix, i)).collect()
}

// Half the source names exist in the reference, with different casing
fn bench_diff_catalogs(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_catalogs");

    for size in [100, 1_000, 10_000] {
        let source = Catalog::from_raw("pipedream", "https://pipedream.com/explore", names(size, "Shared"));
        let mut reference_raw: Vec<String> = names(size / 2, "SHARED");
        reference_raw.extend(names(size / 2, "Other"));
        let reference = Catalog::from_raw("composio", "https://composio.dev/toolkits", reference_raw);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| diff_catalogs(black_box(&source), black_box(&reference)));
        });
    }

    group.finish();
}

fn bench_catalog_from_raw(c: &mut Criterion) {
    let raw: Vec<String> = names(5_000, "Dup").into_iter().flat_map(|n| [n.clone(), format!("  {}  ", n.to_lowercase())]).collect();

    c.bench_function("catalog_from_raw_10k_with_duplicates", |b| {
        b.iter(|| Catalog::from_raw("pipedream", "https://pipedream.com/explore", black_box(&raw)));
    });
}

fn catalog_page(count: usize) -> PageSnapshot {
    let links: String = (0..count)
        .map(|i| format!(r#"<li><a href="/apps/app-{0}"><span>App {0}</span></a></li>"#, i))
        .collect();
    PageSnapshot::from_html(
        "https://pipedream.com/explore",
        format!("<html><body><nav><a href=\"/apps/\">Apps</a></nav><ul>{}</ul></body></html>", links),
    )
}

fn embedded_page(count: usize) -> PageSnapshot {
    let apps: Vec<serde_json::Value> = (0..count)
        .map(|i| serde_json::json!({ "name": format!("App {}", i), "slug": format!("app_{}", i) }))
        .collect();
    let next_data = serde_json::json!({ "props": { "pageProps": { "apps": apps } } });
    PageSnapshot::from_html(
        "https://pipedream.com/explore",
        format!(
            r#"<html><body><div id="__next"></div><script id="__NEXT_DATA__" type="application/json">{}</script></body></html>"#,
            next_data
        ),
    )
}

fn bench_extractor(c: &mut Criterion) {
    let extractor = NameExtractor::for_site(&SiteProfile::pipedream("https://pipedream.com/explore"));
    let mut group = c.benchmark_group("extractor");

    for size in [100, 1_000] {
        let selectors = catalog_page(size);
        let embedded = embedded_page(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("selectors", size), &selectors, |b, page| {
            b.iter(|| extractor.extract(black_box(page)));
        });
        group.bench_with_input(BenchmarkId::new("embedded_data", size), &embedded, |b, page| {
            b.iter(|| extractor.extract(black_box(page)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_diff_catalogs, bench_catalog_from_raw, bench_extractor);
criterion_main!(benches);
