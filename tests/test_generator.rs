use std::fs;

use line_merge_sort::generator::Generator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

mod common;

#[test]
fn test_sort_generated_file() -> Result<(), anyhow::Error> {
    let tmp = TempDir::new()?;
    let input_path = tmp.path().join("generated.dat");
    let output_path = tmp.path().join("sorted.dat");
    Generator::new(&input_path, 2_000, 20)?.run_with_rng(&mut StdRng::seed_from_u64(11))?;

    common::small_chunk_sort(&input_path, &output_path, tmp.path(), 4_096).sort()?;

    let mut expected = common::read_lines(&input_path)?;
    expected.sort();
    let output_lines = common::read_lines(&output_path)?;
    assert_eq!(output_lines.len(), 2_000);
    assert_eq!(output_lines, expected);
    assert_eq!(fs::metadata(&output_path)?.len(), 2_000 * 21);
    assert_eq!(common::spill_files(tmp.path())?, 0);
    Ok(())
}
