mod anchors;
mod classification;
mod config_layering;
mod end_to_end;
mod lifecycle;
