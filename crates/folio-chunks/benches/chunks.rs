use folio_chunks::{compress, page_spans, Codec};

fn make_data(size: usize) -> Vec<u8> {
    // Semi-realistic data: repeating pattern with some entropy
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576, 10485760])]
fn zstd_compress(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| compress(divan::black_box(&data), Codec::Zstd, 3).unwrap());
}

#[divan::bench(args = [65536, 10485760])]
fn split_pages(bencher: divan::Bencher, size: usize) {
    bencher.bench(|| page_spans(divan::black_box(size), 4096).unwrap());
}

fn main() {
    divan::main();
}
