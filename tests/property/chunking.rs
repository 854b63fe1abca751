//! Chunking invariance and agreement with a reference implementation

use md5list::digest::{md5_hex, Md5Hash};
use proptest::prelude::*;

fn digest_in_chunks(data: &[u8], sizes: &[usize]) -> String {
    let mut hash = Md5Hash::new();
    let mut rest = data;
    let mut sizes = sizes.iter().cycle();
    while !rest.is_empty() {
        let take = (*sizes.next().unwrap()).min(rest.len());
        let (head, tail) = rest.split_at(take);
        hash.update(head).unwrap();
        rest = tail;
    }
    hash.finish()
}

proptest! {
    #[test]
    fn prop_matches_reference(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        prop_assert_eq!(md5_hex(&data), format!("{:x}", md5::compute(&data)));
    }

    #[test]
    fn prop_two_way_split_is_invariant(
        data in proptest::collection::vec(any::<u8>(), 0..1024),
        split in any::<prop::sample::Index>(),
    ) {
        let at = split.index(data.len() + 1);
        let mut hash = Md5Hash::new();
        hash.update(&data[..at]).unwrap();
        hash.update(&data[at..]).unwrap();
        prop_assert_eq!(hash.finish(), md5_hex(&data));
    }

    #[test]
    fn prop_arbitrary_chunking_is_invariant(
        data in proptest::collection::vec(any::<u8>(), 0..4096),
        sizes in proptest::collection::vec(1usize..200, 1..16),
    ) {
        prop_assert_eq!(digest_in_chunks(&data, &sizes), md5_hex(&data));
    }

    #[test]
    fn prop_appending_a_byte_changes_fingerprint(
        data in proptest::collection::vec(any::<u8>(), 0..512),
        extra in any::<u8>(),
    ) {
        let mut longer = data.clone();
        longer.push(extra);
        prop_assert_ne!(md5_hex(&longer), md5_hex(&data));
    }
}

#[test]
fn test_one_byte_updates_across_block_boundaries() {
    for len in [0usize, 1, 63, 64, 65, 127, 128, 129] {
        let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
        assert_eq!(digest_in_chunks(&data, &[1]), md5_hex(&data), "length {}", len);
    }
}
