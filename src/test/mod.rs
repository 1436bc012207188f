mod emu_netns;
mod topo_kind;
