//! External merge sort: in-memory run generation followed by a k-way
//! min-heap merge.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use fsutil::TempFile;

use crate::entry::{read_entry, serialized_len, write_entry, Entry};

/// Sorts `entries` in place using quicksort with median-of-three pivot
/// selection, ordering lexicographically by [`Entry::path`].
pub fn quicksort(entries: &mut [Entry]) {
    if entries.len() > 1 {
        let hi = entries.len() - 1;
        quicksort_range(entries, 0, hi);
    }
}

fn quicksort_range(entries: &mut [Entry], lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let pivot = partition(entries, lo, hi);
    if pivot > lo {
        quicksort_range(entries, lo, pivot - 1);
    }
    if pivot < hi {
        quicksort_range(entries, pivot + 1, hi);
    }
}

fn partition(entries: &mut [Entry], lo: usize, hi: usize) -> usize {
    entries.swap(median_of_three(entries, lo, hi), hi);
    let mut store = lo;
    for j in lo..hi {
        if entries[j].path < entries[hi].path {
            entries.swap(store, j);
            store += 1;
        }
    }
    entries.swap(store, hi);
    store
}

/// Returns the index among `lo`, the midpoint, and `hi` whose path is the
/// median of the three, used as the pivot to avoid quicksort's quadratic
/// worst case on already-sorted or reverse-sorted input.
fn median_of_three(entries: &[Entry], lo: usize, hi: usize) -> usize {
    let mid = lo + (hi - lo) / 2;
    let (a, b, c) = (&entries[lo].path, &entries[mid].path, &entries[hi].path);
    if (a <= b) == (b <= c) {
        mid
    } else if (b <= a) == (a <= c) {
        lo
    } else {
        hi
    }
}

/// Reads entries from `input` until their total serialized size would
/// exceed `max_run_bytes`, sorts the batch, and writes it to a new temp
/// file under `run_dir`. Repeats until `input` is drained.
pub fn generate_runs(
    input: &mut impl Read,
    max_run_bytes: usize,
    run_dir: &Path,
) -> std::io::Result<Vec<TempFile>> {
    let mut runs = Vec::new();
    loop {
        let mut batch = Vec::new();
        let mut batch_bytes = 0usize;
        let mut reached_eof = false;
        loop {
            match read_entry(input)? {
                None => {
                    reached_eof = true;
                    break;
                }
                Some(entry) => {
                    batch_bytes += serialized_len(&entry);
                    batch.push(entry);
                    if batch_bytes >= max_run_bytes {
                        break;
                    }
                }
            }
        }

        if !batch.is_empty() {
            quicksort(&mut batch);
            let mut run = TempFile::new(Some(run_dir))
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            {
                let mut writer = BufWriter::new(run.file_mut());
                for entry in &batch {
                    write_entry(&mut writer, entry)?;
                }
                writer.flush()?;
            }
            runs.push(run);
        }

        if reached_eof {
            return Ok(runs);
        }
    }
}

struct HeapNode {
    entry: Entry,
    run_idx: usize,
}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.entry.path == other.entry.path
    }
}

impl Eq for HeapNode {}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the comparison so the smallest
        // path is always on top. A run with no more entries never gets a
        // node pushed back in, which is equivalent to "null entries sort
        // to the bottom".
        other.entry.path.cmp(&self.entry.path)
    }
}

/// Merges `runs` (each individually sorted by path) into `output`, which
/// receives entries in globally sorted order.
pub fn merge_runs(runs: &[TempFile], output: &mut impl Write) -> std::io::Result<()> {
    let mut readers: Vec<BufReader<File>> = runs
        .iter()
        .map(|run| File::open(run.path()).map(BufReader::new))
        .collect::<std::io::Result<_>>()?;

    let mut heap = BinaryHeap::with_capacity(readers.len());
    for (run_idx, reader) in readers.iter_mut().enumerate() {
        if let Some(entry) = read_entry(reader)? {
            heap.push(HeapNode { entry, run_idx });
        }
    }

    while let Some(HeapNode { entry, run_idx }) = heap.pop() {
        write_entry(output, &entry)?;
        if let Some(next) = read_entry(&mut readers[run_idx])? {
            heap.push(HeapNode {
                entry: next,
                run_idx,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> Entry {
        Entry {
            path: path.to_string(),
            hex_digest: "00".to_string(),
        }
    }

    #[test]
    fn quicksort_orders_by_path() {
        let mut entries = vec![entry("c"), entry("a"), entry("b")];
        quicksort(&mut entries);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c"]);
    }

    #[test]
    fn quicksort_handles_already_sorted_input() {
        let mut entries = vec![entry("a"), entry("b"), entry("c"), entry("d")];
        quicksort(&mut entries);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn quicksort_handles_duplicates() {
        let mut entries = vec![entry("b"), entry("a"), entry("b"), entry("a")];
        quicksort(&mut entries);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["a", "a", "b", "b"]);
    }

    #[test]
    fn quicksort_empty_and_singleton_are_noops() {
        let mut empty: Vec<Entry> = Vec::new();
        quicksort(&mut empty);
        assert!(empty.is_empty());

        let mut one = vec![entry("only")];
        quicksort(&mut one);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn generate_runs_splits_on_byte_budget() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Vec::new();
        for path in ["d", "c", "b", "a"] {
            write_entry(&mut input, &entry(path)).unwrap();
        }
        let mut cursor = &input[..];
        // Each entry serializes to 5 bytes; a budget of 4 forces one run
        // per entry.
        let runs = generate_runs(&mut cursor, 4, dir.path()).unwrap();
        assert_eq!(runs.len(), 4);
    }

    #[test]
    fn generate_runs_on_empty_input_yields_no_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut cursor = &b""[..];
        let runs = generate_runs(&mut cursor, 1024, dir.path()).unwrap();
        assert!(runs.is_empty());
    }

    #[test]
    fn merge_runs_interleaves_sorted_runs() {
        let dir = tempfile::tempdir().unwrap();
        let mut run_a = TempFile::new(Some(dir.path())).unwrap();
        for path in ["a", "c", "e"] {
            write_entry(run_a.file_mut(), &entry(path)).unwrap();
        }
        let mut run_b = TempFile::new(Some(dir.path())).unwrap();
        for path in ["b", "d", "f"] {
            write_entry(run_b.file_mut(), &entry(path)).unwrap();
        }

        let mut output = Vec::new();
        merge_runs(&[run_a, run_b], &mut output).unwrap();

        let mut cursor = &output[..];
        let mut paths = Vec::new();
        while let Some(e) = read_entry(&mut cursor).unwrap() {
            paths.push(e.path);
        }
        assert_eq!(paths, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn merge_runs_with_no_runs_produces_empty_output() {
        let mut output = Vec::new();
        merge_runs(&[], &mut output).unwrap();
        assert!(output.is_empty());
    }
}
