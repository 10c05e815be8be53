pub mod street_network;
