#![no_main]
use gridpulse_core::cursor::ByteReader;
use gridpulse_core::error::DecodeError;
use gridpulse_core::grid::{read_gated_field, read_grid_field};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Copy, Default)]
struct Cell {
    gate: u8,
    level: i16,
    lit: bool,
}

fn decode(input: &mut ByteReader<'_>, cells: &mut [Cell]) -> Result<(), DecodeError> {
    let gate = |c: &Cell| c.gate & 1 == 1;
    read_grid_field(input, cells, |c, v| c.gate = v)?;
    read_gated_field(input, cells, gate, |c, v| c.level = v, 0)?;
    read_gated_field(input, cells, gate, |c, v| c.lit = v, false)?;
    Ok(())
}

fuzz_target!(|data: &[u8]| {
    let mut cells = [Cell::default(); 37];
    let mut input = ByteReader::new(data);
    let _ = decode(&mut input, &mut cells);
    assert!(input.position() <= data.len());
});
