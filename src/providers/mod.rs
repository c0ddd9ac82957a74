pub mod ipdata;
