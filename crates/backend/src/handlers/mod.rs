pub mod a001_tienda;
pub mod a002_segmentacion;
