pub mod emu;
pub mod net;
pub mod perf;
pub mod topo;

#[cfg(test)]
mod test;
