pub mod a002_segmentacion;
